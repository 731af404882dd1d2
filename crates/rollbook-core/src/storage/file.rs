//! # JSON File Store
//!
//! Keeps the whole store in memory and rewrites one JSON document on every
//! write. Each write is staged on a copy, written to a temporary file in the
//! same directory and renamed over the old document, so a failed write
//! leaves both the file and the in-memory state exactly as they were.

use super::{MemoryStore, RecordStore};
use crate::formats::StoreDocument;
use crate::primitives::MAX_FILE_STORE_SIZE;
use crate::record::{AdminRecord, StudentRecord};
use crate::{RecordError, RollNumber};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File-backed record store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open the document at `path`, creating an empty one if it is missing.
    ///
    /// Accepts the legacy bare-array student file as well.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let store = Self {
                path,
                inner: MemoryStore::new(),
            };
            store.persist(&store.inner)?;
            tracing::info!(path = %store.path.display(), "Created empty record file");
            return Ok(store);
        }

        let metadata = std::fs::metadata(&path).map_err(RecordError::storage)?;
        if metadata.len() > MAX_FILE_STORE_SIZE {
            return Err(RecordError::StorageUnavailable(format!(
                "File size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_FILE_STORE_SIZE
            )));
        }

        let bytes = std::fs::read(&path).map_err(RecordError::storage)?;
        let doc = StoreDocument::from_json(&bytes)?;
        let inner = MemoryStore::from_document(doc)?;
        tracing::debug!(
            path = %path.display(),
            students = inner.student_count()?,
            "Loaded record file"
        );

        Ok(Self { path, inner })
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stage a write on a copy, persist the copy, then adopt it.
    fn commit<T>(
        &mut self,
        op: impl FnOnce(&mut MemoryStore) -> Result<T, RecordError>,
    ) -> Result<T, RecordError> {
        let mut staged = self.inner.clone();
        let value = op(&mut staged)?;
        self.persist(&staged)?;
        self.inner = staged;
        Ok(value)
    }

    fn persist(&self, store: &MemoryStore) -> Result<(), RecordError> {
        let bytes = store.to_document().to_json()?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(RecordError::storage)?;
        tmp.write_all(&bytes).map_err(RecordError::storage)?;
        tmp.as_file().sync_all().map_err(RecordError::storage)?;
        tmp.persist(&self.path)
            .map_err(|e| RecordError::storage(e.error))?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn create_student(&mut self, record: &StudentRecord) -> Result<(), RecordError> {
        self.commit(|store| store.create_student(record))
    }

    fn fetch_student(&self, roll_number: RollNumber) -> Result<Option<StudentRecord>, RecordError> {
        self.inner.fetch_student(roll_number)
    }

    fn fetch_student_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StudentRecord>, RecordError> {
        self.inner.fetch_student_by_username(username)
    }

    fn update_student(&mut self, record: &StudentRecord) -> Result<(), RecordError> {
        self.commit(|store| store.update_student(record))
    }

    fn delete_student(&mut self, roll_number: RollNumber) -> Result<bool, RecordError> {
        if !self.inner.student_exists(roll_number)? {
            return Ok(false);
        }
        self.commit(|store| store.delete_student(roll_number))
    }

    fn student_exists(&self, roll_number: RollNumber) -> Result<bool, RecordError> {
        self.inner.student_exists(roll_number)
    }

    fn student_username_exists(&self, username: &str) -> Result<bool, RecordError> {
        self.inner.student_username_exists(username)
    }

    fn set_student_credentials(
        &mut self,
        roll_number: RollNumber,
        username: &str,
        password_hash: &str,
    ) -> Result<(), RecordError> {
        self.commit(|store| store.set_student_credentials(roll_number, username, password_hash))
    }

    fn list_students(&self) -> Result<Vec<StudentRecord>, RecordError> {
        self.inner.list_students()
    }

    fn student_count(&self) -> Result<usize, RecordError> {
        self.inner.student_count()
    }

    fn create_admin(
        &mut self,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminRecord, RecordError> {
        self.commit(|store| store.create_admin(name, username, password_hash))
    }

    fn fetch_admin(&self, username: &str) -> Result<Option<AdminRecord>, RecordError> {
        self.inner.fetch_admin(username)
    }

    fn admin_username_exists(&self, username: &str) -> Result<bool, RecordError> {
        self.inner.admin_username_exists(username)
    }

    fn admin_count(&self) -> Result<usize, RecordError> {
        self.inner.admin_count()
    }
}

// =============================================================================
// TESTS
// =============================================================================
