//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `AuthContext`: the bearer token every API call receives explicitly
//! - `Session`: persistence of the current `AuthContext` between runs
//! - `CredentialStore`: OS keychain storage used for silent re-login

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{AuthContext, Session};
