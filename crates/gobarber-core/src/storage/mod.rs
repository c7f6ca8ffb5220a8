//! Durable key-value storage for client state.
//!
//! `KeyValueStorage` is the small synchronous get/set/remove contract the
//! session store persists through. Backends:
//!
//! - `MemoryStorage`: process-local, for tests and throwaway runs
//! - `FileStorage`: a single JSON file in the application data directory
//! - `KeyringStorage` (in `auth::credentials`): the OS keychain

pub mod file;
pub mod memory;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Prefix shared by every key the application writes
pub const KEY_PREFIX: &str = "@GoBarber";

/// Storage key for the raw bearer token
pub const TOKEN_KEY: &str = "@GoBarber:token";

/// Storage key for the JSON-serialized user profile
pub const USER_KEY: &str = "@GoBarber:user";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// String-keyed durable storage.
///
/// Removing a key that is not present succeeds.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_distinct_and_prefixed() {
        assert_ne!(TOKEN_KEY, USER_KEY);
        assert!(TOKEN_KEY.starts_with(KEY_PREFIX));
        assert!(USER_KEY.starts_with(KEY_PREFIX));
    }
}
