//! REST API client module for the school-records backend.
//!
//! This module provides the `ApiClient` for listing, adding, editing and
//! deleting admin records, and for the batch writes staged forms submit.
//!
//! The API uses JWT bearer token authentication obtained through the
//! backend's `/auth/login` endpoint.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
