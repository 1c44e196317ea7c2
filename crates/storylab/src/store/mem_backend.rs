use super::backend::StorageBackend;
use crate::error::{Result, StoryError};
use crate::model::BookRecord;
use std::cell::RefCell;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since storylab is single-threaded.
/// This avoids the overhead of `RwLock` while still allowing the
/// `StorageBackend` trait to use `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    records: RefCell<HashMap<Uuid, BookRecord>>,
    /// Preserves insertion order so listings are deterministic.
    order: RefCell<Vec<Uuid>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }
}

impl StorageBackend for MemBackend {
    fn load_record(&self, id: &Uuid) -> Result<Option<BookRecord>> {
        Ok(self.records.borrow().get(id).cloned())
    }

    fn save_record(&self, record: &BookRecord) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(StoryError::Store("Simulated write error".to_string()));
        }
        let id = record.book.id;
        if self
            .records
            .borrow_mut()
            .insert(id, record.clone())
            .is_none()
        {
            self.order.borrow_mut().push(id);
        }
        Ok(())
    }

    fn delete_record(&self, id: &Uuid) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(StoryError::Store("Simulated write error".to_string()));
        }
        self.records.borrow_mut().remove(id);
        self.order.borrow_mut().retain(|known| known != id);
        Ok(())
    }

    fn list_record_ids(&self) -> Result<Vec<Uuid>> {
        Ok(self.order.borrow().clone())
    }
}
