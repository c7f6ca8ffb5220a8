//! Data models for GoBarber entities.
//!
//! - `UserProfile`: the signed-in person, as returned by the API
//! - `AuthResponse`: the payload of a successful session creation

pub mod user;

pub use user::{AuthResponse, UserProfile};
