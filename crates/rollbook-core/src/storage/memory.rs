//! # In-Memory Store
//!
//! `BTreeMap`-backed storage. Used directly for volatile sessions and tests,
//! and as the working copy behind the JSON file backend.

use super::RecordStore;
use crate::formats::{FileStudent, StoreDocument};
use crate::primitives::{FILE_FORMAT, FILE_FORMAT_VERSION};
use crate::record::{AdminRecord, StudentRecord};
use crate::{AdminId, RecordError, RollNumber};
use std::collections::BTreeMap;

/// Volatile record store.
///
/// Uses `BTreeMap` exclusively so listings come back in key order.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    /// Student storage: roll number -> record
    students: BTreeMap<RollNumber, StudentRecord>,
    /// Signup index: username -> roll number
    student_usernames: BTreeMap<String, RollNumber>,
    /// Admin storage: username -> record
    admins: BTreeMap<String, AdminRecord>,
    /// Next admin id to assign
    next_admin_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            students: BTreeMap::new(),
            student_usernames: BTreeMap::new(),
            admins: BTreeMap::new(),
            next_admin_id: 1,
        }
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a file document, rebuilding the indexes.
    pub fn from_document(doc: StoreDocument) -> Result<Self, RecordError> {
        let mut store = Self::new();
        for student in doc.students {
            let record = student.into_record()?;
            store.create_student(&record)?;
        }
        for admin in doc.admins {
            if store.admins.contains_key(&admin.username) {
                return Err(RecordError::DuplicateUsername(admin.username));
            }
            store.next_admin_id = store.next_admin_id.max(admin.id.0.saturating_add(1));
            store.admins.insert(admin.username.clone(), admin);
        }
        store.next_admin_id = store.next_admin_id.max(doc.next_admin_id);
        Ok(store)
    }

    /// Snapshot the store as a file document.
    #[must_use]
    pub fn to_document(&self) -> StoreDocument {
        let mut admins: Vec<AdminRecord> = self.admins.values().cloned().collect();
        admins.sort_by_key(|a| a.id);
        StoreDocument {
            format: FILE_FORMAT.to_string(),
            version: FILE_FORMAT_VERSION,
            next_admin_id: self.next_admin_id,
            students: self.students.values().map(FileStudent::from_record).collect(),
            admins,
        }
    }
}

impl RecordStore for MemoryStore {
    fn create_student(&mut self, record: &StudentRecord) -> Result<(), RecordError> {
        let roll_number = record.roll_number();
        if self.students.contains_key(&roll_number) {
            return Err(RecordError::DuplicateKey(roll_number));
        }
        if let Some(username) = record.username() {
            if self.student_usernames.contains_key(username) {
                return Err(RecordError::DuplicateUsername(username.to_string()));
            }
            self.student_usernames
                .insert(username.to_string(), roll_number);
        }
        self.students.insert(roll_number, record.clone());
        Ok(())
    }

    fn fetch_student(&self, roll_number: RollNumber) -> Result<Option<StudentRecord>, RecordError> {
        Ok(self.students.get(&roll_number).cloned())
    }

    fn fetch_student_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StudentRecord>, RecordError> {
        Ok(self
            .student_usernames
            .get(username)
            .and_then(|roll| self.students.get(roll))
            .cloned())
    }

    fn update_student(&mut self, record: &StudentRecord) -> Result<(), RecordError> {
        let roll_number = record.roll_number();
        let Some(existing) = self.students.get(&roll_number) else {
            return Err(RecordError::NotFound(roll_number));
        };

        if existing.username() != record.username() {
            if let Some(new_name) = record.username() {
                if self
                    .student_usernames
                    .get(new_name)
                    .is_some_and(|owner| *owner != roll_number)
                {
                    return Err(RecordError::DuplicateUsername(new_name.to_string()));
                }
            }
            if let Some(old_name) = existing.username() {
                self.student_usernames.remove(old_name);
            }
            if let Some(new_name) = record.username() {
                self.student_usernames
                    .insert(new_name.to_string(), roll_number);
            }
        }

        self.students.insert(roll_number, record.clone());
        Ok(())
    }

    fn delete_student(&mut self, roll_number: RollNumber) -> Result<bool, RecordError> {
        let Some(removed) = self.students.remove(&roll_number) else {
            return Ok(false);
        };
        if let Some(username) = removed.username() {
            self.student_usernames.remove(username);
        }
        Ok(true)
    }

    fn student_exists(&self, roll_number: RollNumber) -> Result<bool, RecordError> {
        Ok(self.students.contains_key(&roll_number))
    }

    fn student_username_exists(&self, username: &str) -> Result<bool, RecordError> {
        Ok(self.student_usernames.contains_key(username))
    }

    fn set_student_credentials(
        &mut self,
        roll_number: RollNumber,
        username: &str,
        password_hash: &str,
    ) -> Result<(), RecordError> {
        let Some(mut record) = self.students.get(&roll_number).cloned() else {
            return Err(RecordError::NotFound(roll_number));
        };
        record.set_credentials(username.to_string(), password_hash.to_string());
        self.update_student(&record)
    }

    fn list_students(&self) -> Result<Vec<StudentRecord>, RecordError> {
        Ok(self.students.values().cloned().collect())
    }

    fn student_count(&self) -> Result<usize, RecordError> {
        Ok(self.students.len())
    }

    fn create_admin(
        &mut self,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminRecord, RecordError> {
        if self.admins.contains_key(username) {
            return Err(RecordError::DuplicateUsername(username.to_string()));
        }
        let admin = AdminRecord {
            id: AdminId(self.next_admin_id),
            name: name.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        self.next_admin_id = self.next_admin_id.saturating_add(1);
        self.admins.insert(admin.username.clone(), admin.clone());
        Ok(admin)
    }

    fn fetch_admin(&self, username: &str) -> Result<Option<AdminRecord>, RecordError> {
        Ok(self.admins.get(username).cloned())
    }

    fn admin_username_exists(&self, username: &str) -> Result<bool, RecordError> {
        Ok(self.admins.contains_key(username))
    }

    fn admin_count(&self) -> Result<usize, RecordError> {
        Ok(self.admins.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================
