//! GoBarber core library.
//!
//! Session management, the GoBarber REST API client, durable key-value
//! storage backends and form validation shared by every front end.

pub mod api;
pub mod auth;
pub mod config;
pub mod forms;
pub mod models;
pub mod storage;

pub use api::{ApiClient, ApiError, RemoteAuthService};
pub use auth::{KeyringStorage, SessionData, SessionError, SessionState, SessionStore};
pub use config::{Config, StorageBackend};
pub use models::{AuthResponse, UserProfile};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
