use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{PersistenceError, Repository};

/// Stores a collection as one pretty-printed JSON array.
///
/// Saves go through a sibling temp file and a rename so readers never see a
/// half-written snapshot.
pub struct JsonFileRepository<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileRepository<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn json_error(&self, source: serde_json::Error) -> PersistenceError {
        PersistenceError::Json {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl<T> Repository<T> for JsonFileRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    #[instrument(fields(path = %self.path.display()), skip(self))]
    fn load_all(&self) -> Result<Vec<T>, PersistenceError> {
        if !self.path.exists() {
            debug!("Snapshot file missing, starting empty");
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        // Hand-edited files sometimes keep a trailing comma after the array.
        let content = raw.trim().trim_end_matches(',').trim_end();
        if content.is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<T> = serde_json::from_str(content).map_err(|e| self.json_error(e))?;
        debug!(record_count = records.len(), "Snapshot loaded");
        Ok(records)
    }

    #[instrument(fields(path = %self.path.display(), record_count = records.len()), skip(self, records))]
    fn save_all(&self, records: &[T]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string_pretty(records).map_err(|e| self.json_error(e))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        debug!("Snapshot saved");
        Ok(())
    }
}
