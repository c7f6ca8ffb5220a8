//! Authentication module for managing the signed-in session.
//!
//! This module provides:
//! - `SessionStore`: sign-in, sign-out and profile updates, mirrored to storage
//! - `KeyringStorage`: OS keychain backed storage for the session entries
//!
//! The session is restored from storage when the store is built and stays
//! valid until an explicit sign-out.

pub mod credentials;
pub mod session;

pub use credentials::KeyringStorage;
pub use session::{SessionData, SessionError, SessionState, SessionStore};
