use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{PersistenceError, Repository};

/// In-memory repository. Clones share the same backing snapshot, so a test can
/// keep one handle to inspect what a service saved.
#[derive(Clone)]
pub struct MemoryRepository<T> {
    records: Arc<Mutex<Vec<T>>>,
    fail_saves: Arc<AtomicBool>,
}

impl<T: Clone> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            fail_saves: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Makes every following `save_all` fail until reset.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl<T: Clone> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send> Repository<T> for MemoryRepository<T> {
    fn load_all(&self) -> Result<Vec<T>, PersistenceError> {
        Ok(self.snapshot())
    }

    fn save_all(&self, records: &[T]) -> Result<(), PersistenceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable("memory repository rejected save".to_string()));
        }
        *self.records.lock().unwrap_or_else(|e| e.into_inner()) = records.to_vec();
        Ok(())
    }
}
