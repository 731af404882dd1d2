//! # redb-backed Record Storage
//!
//! A disk-backed record store on the redb embedded database.
//!
//! - ACID transactions, one write transaction per store call
//! - Crash safety (copy-on-write B-trees)
//! - Username uniqueness checked inside the same write transaction
//!
//! Student rows are postcard-encoded [`StudentRow`]s, so the marks blob and
//! denormalized metrics have the same shape as the SQLite table.

use super::RecordStore;
use crate::formats::StudentRow;
use crate::record::{AdminRecord, StudentRecord};
use crate::{AdminId, RecordError, RollNumber};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for students: roll number -> postcard `StudentRow`
const STUDENTS: TableDefinition<u32, &[u8]> = TableDefinition::new("students");

/// Table for signup usernames: username -> roll number
const STUDENT_USERNAMES: TableDefinition<&str, u32> = TableDefinition::new("student_usernames");

/// Table for admins: admin id -> postcard `AdminRecord`
const ADMINS: TableDefinition<u64, &[u8]> = TableDefinition::new("admins");

/// Table for admin usernames: username -> admin id
const ADMIN_USERNAMES: TableDefinition<&str, u64> = TableDefinition::new("admin_usernames");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_ADMIN_ID: &str = "next_admin_id";

/// A disk-backed record store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

fn encode_row(record: &StudentRecord) -> Result<Vec<u8>, RecordError> {
    let row = StudentRow::from_record(record)?;
    postcard::to_allocvec(&row).map_err(RecordError::serialization)
}

fn decode_row(bytes: &[u8]) -> Result<StudentRecord, RecordError> {
    let row: StudentRow = postcard::from_bytes(bytes).map_err(RecordError::serialization)?;
    row.into_record()
}

fn decode_admin(bytes: &[u8]) -> Result<AdminRecord, RecordError> {
    postcard::from_bytes(bytes).map_err(RecordError::serialization)
}

impl RedbStore {
    /// Open or create a record database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let db = Database::create(path.as_ref()).map_err(RecordError::storage)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(RecordError::storage)?;
            let _ = write_txn
                .open_table(STUDENTS)
                .map_err(RecordError::storage)?;
            let _ = write_txn
                .open_table(STUDENT_USERNAMES)
                .map_err(RecordError::storage)?;
            let _ = write_txn.open_table(ADMINS).map_err(RecordError::storage)?;
            let _ = write_txn
                .open_table(ADMIN_USERNAMES)
                .map_err(RecordError::storage)?;
            let _ = write_txn
                .open_table(METADATA)
                .map_err(RecordError::storage)?;
            write_txn.commit().map_err(RecordError::storage)?;
        }

        tracing::debug!(path = %path.as_ref().display(), "Opened redb record store");
        Ok(Self { db })
    }

    /// Write a full student row, keeping the username index in step.
    ///
    /// `must_exist` selects update (`NotFound` if absent) versus create
    /// (`DuplicateKey` if present).
    fn put_student(&mut self, record: &StudentRecord, must_exist: bool) -> Result<(), RecordError> {
        let roll_number = record.roll_number();
        let bytes = encode_row(record)?;

        let write_txn = self.db.begin_write().map_err(RecordError::storage)?;
        {
            let mut students = write_txn
                .open_table(STUDENTS)
                .map_err(RecordError::storage)?;
            let mut usernames = write_txn
                .open_table(STUDENT_USERNAMES)
                .map_err(RecordError::storage)?;

            let previous = students
                .get(roll_number.value())
                .map_err(RecordError::storage)?
                .map(|guard| decode_row(guard.value()))
                .transpose()?;

            match (&previous, must_exist) {
                (None, true) => return Err(RecordError::NotFound(roll_number)),
                (Some(_), false) => return Err(RecordError::DuplicateKey(roll_number)),
                _ => {}
            }

            let old_username = previous.as_ref().and_then(|p| p.username());
            if old_username != record.username() {
                if let Some(name) = record.username() {
                    let owner = usernames
                        .get(name)
                        .map_err(RecordError::storage)?
                        .map(|guard| guard.value());
                    if owner.is_some_and(|roll| roll != roll_number.value()) {
                        return Err(RecordError::DuplicateUsername(name.to_string()));
                    }
                }
                if let Some(old) = old_username {
                    usernames.remove(old).map_err(RecordError::storage)?;
                }
                if let Some(name) = record.username() {
                    usernames
                        .insert(name, roll_number.value())
                        .map_err(RecordError::storage)?;
                }
            }

            students
                .insert(roll_number.value(), bytes.as_slice())
                .map_err(RecordError::storage)?;
        }
        write_txn.commit().map_err(RecordError::storage)?;
        Ok(())
    }
}

impl RecordStore for RedbStore {
    fn create_student(&mut self, record: &StudentRecord) -> Result<(), RecordError> {
        self.put_student(record, false)
    }

    fn fetch_student(&self, roll_number: RollNumber) -> Result<Option<StudentRecord>, RecordError> {
        let read_txn = self.db.begin_read().map_err(RecordError::storage)?;
        let table = read_txn
            .open_table(STUDENTS)
            .map_err(RecordError::storage)?;
        table
            .get(roll_number.value())
            .map_err(RecordError::storage)?
            .map(|guard| decode_row(guard.value()))
            .transpose()
    }

    fn fetch_student_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StudentRecord>, RecordError> {
        let roll = {
            let read_txn = self.db.begin_read().map_err(RecordError::storage)?;
            let table = read_txn
                .open_table(STUDENT_USERNAMES)
                .map_err(RecordError::storage)?;
            table
                .get(username)
                .map_err(RecordError::storage)?
                .map(|guard| guard.value())
        };
        match roll {
            Some(roll) => self.fetch_student(RollNumber(roll)),
            None => Ok(None),
        }
    }

    fn update_student(&mut self, record: &StudentRecord) -> Result<(), RecordError> {
        self.put_student(record, true)
    }

    fn delete_student(&mut self, roll_number: RollNumber) -> Result<bool, RecordError> {
        let write_txn = self.db.begin_write().map_err(RecordError::storage)?;
        let removed = {
            let mut students = write_txn
                .open_table(STUDENTS)
                .map_err(RecordError::storage)?;
            let mut usernames = write_txn
                .open_table(STUDENT_USERNAMES)
                .map_err(RecordError::storage)?;

            let removed = students
                .remove(roll_number.value())
                .map_err(RecordError::storage)?
                .map(|guard| decode_row(guard.value()))
                .transpose()?;
            if let Some(username) = removed.as_ref().and_then(|r| r.username()) {
                usernames.remove(username).map_err(RecordError::storage)?;
            }
            removed.is_some()
        };
        write_txn.commit().map_err(RecordError::storage)?;
        Ok(removed)
    }

    fn student_exists(&self, roll_number: RollNumber) -> Result<bool, RecordError> {
        let read_txn = self.db.begin_read().map_err(RecordError::storage)?;
        let table = read_txn
            .open_table(STUDENTS)
            .map_err(RecordError::storage)?;
        Ok(table
            .get(roll_number.value())
            .map_err(RecordError::storage)?
            .is_some())
    }

    fn student_username_exists(&self, username: &str) -> Result<bool, RecordError> {
        let read_txn = self.db.begin_read().map_err(RecordError::storage)?;
        let table = read_txn
            .open_table(STUDENT_USERNAMES)
            .map_err(RecordError::storage)?;
        Ok(table.get(username).map_err(RecordError::storage)?.is_some())
    }

    fn set_student_credentials(
        &mut self,
        roll_number: RollNumber,
        username: &str,
        password_hash: &str,
    ) -> Result<(), RecordError> {
        let Some(mut record) = self.fetch_student(roll_number)? else {
            return Err(RecordError::NotFound(roll_number));
        };
        record.set_credentials(username.to_string(), password_hash.to_string());
        self.put_student(&record, true)
    }

    fn list_students(&self) -> Result<Vec<StudentRecord>, RecordError> {
        let read_txn = self.db.begin_read().map_err(RecordError::storage)?;
        let table = read_txn
            .open_table(STUDENTS)
            .map_err(RecordError::storage)?;

        let mut records = Vec::new();
        for entry in table.iter().map_err(RecordError::storage)? {
            let (_, value) = entry.map_err(RecordError::storage)?;
            records.push(decode_row(value.value())?);
        }
        Ok(records)
    }

    fn student_count(&self) -> Result<usize, RecordError> {
        let read_txn = self.db.begin_read().map_err(RecordError::storage)?;
        let table = read_txn
            .open_table(STUDENTS)
            .map_err(RecordError::storage)?;
        let len = table.len().map_err(RecordError::storage)?;
        usize::try_from(len).map_err(RecordError::storage)
    }

    fn create_admin(
        &mut self,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminRecord, RecordError> {
        let write_txn = self.db.begin_write().map_err(RecordError::storage)?;
        let admin = {
            let mut admins = write_txn.open_table(ADMINS).map_err(RecordError::storage)?;
            let mut usernames = write_txn
                .open_table(ADMIN_USERNAMES)
                .map_err(RecordError::storage)?;
            let mut metadata = write_txn
                .open_table(METADATA)
                .map_err(RecordError::storage)?;

            if usernames
                .get(username)
                .map_err(RecordError::storage)?
                .is_some()
            {
                return Err(RecordError::DuplicateUsername(username.to_string()));
            }

            let next_id = metadata
                .get(NEXT_ADMIN_ID)
                .map_err(RecordError::storage)?
                .map_or(1, |guard| guard.value());
            let admin = AdminRecord {
                id: AdminId(next_id),
                name: name.to_string(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            };
            let bytes = postcard::to_allocvec(&admin).map_err(RecordError::serialization)?;

            admins
                .insert(next_id, bytes.as_slice())
                .map_err(RecordError::storage)?;
            usernames
                .insert(username, next_id)
                .map_err(RecordError::storage)?;
            metadata
                .insert(NEXT_ADMIN_ID, next_id.saturating_add(1))
                .map_err(RecordError::storage)?;
            admin
        };
        write_txn.commit().map_err(RecordError::storage)?;
        Ok(admin)
    }

    fn fetch_admin(&self, username: &str) -> Result<Option<AdminRecord>, RecordError> {
        let read_txn = self.db.begin_read().map_err(RecordError::storage)?;
        let usernames = read_txn
            .open_table(ADMIN_USERNAMES)
            .map_err(RecordError::storage)?;
        let Some(id) = usernames
            .get(username)
            .map_err(RecordError::storage)?
            .map(|guard| guard.value())
        else {
            return Ok(None);
        };

        let admins = read_txn.open_table(ADMINS).map_err(RecordError::storage)?;
        admins
            .get(id)
            .map_err(RecordError::storage)?
            .map(|guard| decode_admin(guard.value()))
            .transpose()
    }

    fn admin_username_exists(&self, username: &str) -> Result<bool, RecordError> {
        let read_txn = self.db.begin_read().map_err(RecordError::storage)?;
        let table = read_txn
            .open_table(ADMIN_USERNAMES)
            .map_err(RecordError::storage)?;
        Ok(table.get(username).map_err(RecordError::storage)?.is_some())
    }

    fn admin_count(&self) -> Result<usize, RecordError> {
        let read_txn = self.db.begin_read().map_err(RecordError::storage)?;
        let table = read_txn.open_table(ADMINS).map_err(RecordError::storage)?;
        let len = table.len().map_err(RecordError::storage)?;
        usize::try_from(len).map_err(RecordError::storage)
    }
}

// =============================================================================
// TESTS
// =============================================================================
