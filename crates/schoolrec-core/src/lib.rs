//! Core library for the school-records admin client.
//!
//! - `api`: REST client and its error type
//! - `auth`: auth context, persisted session and keychain credentials
//! - `config`: user configuration and local directories
//! - `models`: backend records and response envelopes
//! - `staging`: in-memory row staging for class schedules and enrollment
//! - `utils`: text and date formatting helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod staging;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthContext, CredentialStore, Session};
pub use config::Config;
