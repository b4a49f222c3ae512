use super::KeyValueStore;
use crate::error::{PortalError, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// What a failing write should look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    QuotaExceeded,
    Io,
}

/// In-memory storage for testing.
///
/// Uses `RefCell` for interior mutability since the app is single-threaded.
#[derive(Default)]
pub struct MemStorage {
    values: RefCell<HashMap<String, String>>,
    simulate_write_error: Cell<Option<WriteFailure>>,
    writes: Cell<usize>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing failure simulation.
    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Make subsequent writes fail until cleared with `None`.
    pub fn set_simulate_write_error(&self, failure: Option<WriteFailure>) {
        self.simulate_write_error.set(failure);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl KeyValueStore for MemStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        match self.simulate_write_error.get() {
            Some(WriteFailure::QuotaExceeded) => {
                return Err(PortalError::StorageQuotaExceeded {
                    needed: value.len() as u64,
                    quota: 0,
                })
            }
            Some(WriteFailure::Io) => {
                return Err(PortalError::Io(std::io::Error::other(
                    "Simulated write error",
                )))
            }
            None => {}
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}
