//! # Record Storage
//!
//! The `RecordStore` trait and its backends.
//!
//! | Backend | Type | Durability |
//! |---------|------|------------|
//! | memory  | [`MemoryStore`] | volatile |
//! | file    | [`JsonFileStore`] | JSON document, atomic replace |
//! | redb    | [`RedbStore`] | ACID embedded database |
//! | sqlite  | `SqliteStore` (feature `sqlite`) | relational, constraint-checked |
//!
//! Every write is atomic per record, and every backend enforces roll-number
//! and username uniqueness inside the write itself. Callers may pre-check
//! with `student_exists` / `*_username_exists`, but the store is the
//! authority.

mod file;
mod memory;
mod redb_store;
#[cfg(feature = "sqlite")]
mod sqlite_store;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use redb_store::RedbStore;
#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteStore;

use crate::record::{AdminRecord, StudentRecord};
use crate::{RecordError, Role, RollNumber};

// =============================================================================
// RECORDSTORE TRAIT
// =============================================================================

/// Durable storage for student and admin records.
///
/// All fallible operations return `Result<T, RecordError>`; storage faults
/// surface as `RecordError::StorageUnavailable`.
pub trait RecordStore {
    /// Insert a new student. Fails with `DuplicateKey` if the roll number
    /// exists, or `DuplicateUsername` if the record carries a taken username.
    fn create_student(&mut self, record: &StudentRecord) -> Result<(), RecordError>;

    /// Fetch a student by roll number.
    fn fetch_student(&self, roll_number: RollNumber) -> Result<Option<StudentRecord>, RecordError>;

    /// Fetch the student who signed up with this username.
    fn fetch_student_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StudentRecord>, RecordError>;

    /// Replace a whole student record. Fails with `NotFound` if absent.
    fn update_student(&mut self, record: &StudentRecord) -> Result<(), RecordError>;

    /// Delete a student. Returns whether a record was removed.
    fn delete_student(&mut self, roll_number: RollNumber) -> Result<bool, RecordError>;

    /// Check whether a roll number is taken.
    fn student_exists(&self, roll_number: RollNumber) -> Result<bool, RecordError>;

    /// Check whether any student signed up with this username.
    fn student_username_exists(&self, username: &str) -> Result<bool, RecordError>;

    /// Attach signup credentials to an existing student.
    ///
    /// Fails with `NotFound` if the roll number is gone and
    /// `DuplicateUsername` if another student holds the username.
    fn set_student_credentials(
        &mut self,
        roll_number: RollNumber,
        username: &str,
        password_hash: &str,
    ) -> Result<(), RecordError>;

    /// All students, ordered by roll number.
    fn list_students(&self) -> Result<Vec<StudentRecord>, RecordError>;

    /// Number of student records, without decoding them.
    fn student_count(&self) -> Result<usize, RecordError>;

    /// Insert an admin with the next free id. Fails with `DuplicateUsername`.
    fn create_admin(
        &mut self,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminRecord, RecordError>;

    /// Fetch an admin by username.
    fn fetch_admin(&self, username: &str) -> Result<Option<AdminRecord>, RecordError>;

    /// Check whether an admin username is taken.
    fn admin_username_exists(&self, username: &str) -> Result<bool, RecordError>;

    /// Number of admin accounts.
    fn admin_count(&self) -> Result<usize, RecordError>;

    /// Password hash for a username of the given role, if the account exists.
    fn fetch_password_hash(
        &self,
        role: Role,
        username: &str,
    ) -> Result<Option<String>, RecordError> {
        match role {
            Role::Admin => Ok(self.fetch_admin(username)?.map(|a| a.password_hash)),
            Role::Student => Ok(self
                .fetch_student_by_username(username)?
                .and_then(|s| s.password_hash().map(str::to_string))),
        }
    }
}

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Runtime-selected storage backend.
///
/// Lets the binary pick a backend from configuration while the
/// `RecordManager` stays generic over a single `RecordStore` type.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory maps (fast, volatile).
    InMemory(MemoryStore),
    /// JSON document on disk.
    File(JsonFileStore),
    /// Disk-backed redb database (ACID, persistent).
    Redb(RedbStore),
    /// Relational SQLite database.
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

impl StorageBackend {
    /// Short name of the backend, as used in configuration.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InMemory(_) => "memory",
            Self::File(_) => "file",
            Self::Redb(_) => "redb",
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => "sqlite",
        }
    }

    /// Check if the backend persists across runs.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        !matches!(self, Self::InMemory(_))
    }
}

/// Forward a `RecordStore` call to whichever backend is active.
macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            StorageBackend::InMemory($store) => $call,
            StorageBackend::File($store) => $call,
            StorageBackend::Redb($store) => $call,
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite($store) => $call,
        }
    };
}

impl RecordStore for StorageBackend {
    fn create_student(&mut self, record: &StudentRecord) -> Result<(), RecordError> {
        dispatch!(self, s => s.create_student(record))
    }

    fn fetch_student(&self, roll_number: RollNumber) -> Result<Option<StudentRecord>, RecordError> {
        dispatch!(self, s => s.fetch_student(roll_number))
    }

    fn fetch_student_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StudentRecord>, RecordError> {
        dispatch!(self, s => s.fetch_student_by_username(username))
    }

    fn update_student(&mut self, record: &StudentRecord) -> Result<(), RecordError> {
        dispatch!(self, s => s.update_student(record))
    }

    fn delete_student(&mut self, roll_number: RollNumber) -> Result<bool, RecordError> {
        dispatch!(self, s => s.delete_student(roll_number))
    }

    fn student_exists(&self, roll_number: RollNumber) -> Result<bool, RecordError> {
        dispatch!(self, s => s.student_exists(roll_number))
    }

    fn student_username_exists(&self, username: &str) -> Result<bool, RecordError> {
        dispatch!(self, s => s.student_username_exists(username))
    }

    fn set_student_credentials(
        &mut self,
        roll_number: RollNumber,
        username: &str,
        password_hash: &str,
    ) -> Result<(), RecordError> {
        dispatch!(self, s => s.set_student_credentials(roll_number, username, password_hash))
    }

    fn list_students(&self) -> Result<Vec<StudentRecord>, RecordError> {
        dispatch!(self, s => s.list_students())
    }

    fn student_count(&self) -> Result<usize, RecordError> {
        dispatch!(self, s => s.student_count())
    }

    fn create_admin(
        &mut self,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminRecord, RecordError> {
        dispatch!(self, s => s.create_admin(name, username, password_hash))
    }

    fn fetch_admin(&self, username: &str) -> Result<Option<AdminRecord>, RecordError> {
        dispatch!(self, s => s.fetch_admin(username))
    }

    fn admin_username_exists(&self, username: &str) -> Result<bool, RecordError> {
        dispatch!(self, s => s.admin_username_exists(username))
    }

    fn admin_count(&self) -> Result<usize, RecordError> {
        dispatch!(self, s => s.admin_count())
    }

    fn fetch_password_hash(
        &self,
        role: Role,
        username: &str,
    ) -> Result<Option<String>, RecordError> {
        dispatch!(self, s => s.fetch_password_hash(role, username))
    }
}
