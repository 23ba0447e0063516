//! Key-value store abstraction.
//!
//! The persistence layer only needs string values under string keys, the
//! same capability the browser's `localStorage` offers. Backends:
//! - [`MemoryStore`]: in-process map, for tests and ephemeral use
//! - [`FileStore`]: one JSON file on disk (native targets)
//!
//! The WASM bindings add a `localStorage` backend.

mod memory;
#[cfg(feature = "native")]
mod file;

pub use memory::MemoryStore;
#[cfg(feature = "native")]
pub use file::FileStore;

use crate::error::StorageError;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Trait for string key-value stores.
pub trait KeyValueStore {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
