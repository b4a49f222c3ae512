//! # Durable Storage
//!
//! The cart survives between runs by writing through to a small key-value
//! store, the terminal equivalent of a browser's origin-scoped local storage.
//! [`KeyValueStore`] is the seam:
//!
//! - [`fs::FileStorage`]: production storage, one JSON file per key in the data
//!   directory, written atomically and capped by a byte quota.
//! - [`memory::MemStorage`]: in-memory storage for tests, with write-failure
//!   simulation.
//!
//! ## Storage Format
//!
//! ```text
//! ~/.local/share/portalz/
//! ├── cart.json          # The whole cart as one structured value
//! └── portalz.toml       # Optional configuration
//! ```
//!
//! Values are opaque strings at this layer. Parsing, and what to do when a value
//! does not parse, is the caller's business.

use crate::error::Result;

pub mod fs;
pub mod memory;

/// Abstract interface for durable key-value storage.
///
/// All methods take `&self`; the app is single-threaded and implementations
/// use interior mutability where they need it.
pub trait KeyValueStore {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    /// Fails with `StorageQuotaExceeded` when the store is full.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Forget a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Shared references are stores too, so a test can keep a handle on the
/// storage it hands to a cart.
impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
