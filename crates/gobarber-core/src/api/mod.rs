//! REST API client module for the GoBarber backend.
//!
//! This module provides the `RemoteAuthService` seam used by the session
//! store, and `ApiClient`, its reqwest-backed implementation.
//!
//! Sessions are created by posting credentials to the `sessions` endpoint,
//! which answers with the user profile and a bearer token.

pub mod client;
pub mod error;

pub use client::{ApiClient, RemoteAuthService};
pub use error::ApiError;
