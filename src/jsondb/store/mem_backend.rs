use super::backend::StorageBackend;
use crate::error::{DbError, Result};
use std::cell::RefCell;
use std::path::PathBuf;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since jsondb is single-threaded,
/// which lets `StorageBackend` keep `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    content: RefCell<Option<String>>,
    backups: RefCell<Vec<String>>,
    writes: RefCell<usize>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing persisted document.
    pub fn with_content(content: impl Into<String>) -> Self {
        let backend = Self::default();
        *backend.content.borrow_mut() = Some(content.into());
        backend
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// The currently persisted document.
    pub fn snapshot(&self) -> Option<String> {
        self.content.borrow().clone()
    }

    pub fn backups(&self) -> Vec<String> {
        self.backups.borrow().clone()
    }

    /// Number of successful saves.
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl StorageBackend for MemBackend {
    fn exists(&self) -> bool {
        self.content.borrow().is_some()
    }

    fn load(&self) -> Result<Option<String>> {
        Ok(self.content.borrow().clone())
    }

    fn save(&self, content: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(DbError::Io(std::io::Error::other("simulated write error")));
        }
        *self.content.borrow_mut() = Some(content.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn backup(&self, previous: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(DbError::Io(std::io::Error::other("simulated write error")));
        }
        self.backups.borrow_mut().push(previous.to_string());
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("memory://jsondb")
    }
}
