//! # Record Manager
//!
//! The business operations over a [`RecordStore`]: adding, removing,
//! updating and reporting on students, student signup, and administrator
//! creation.
//!
//! The manager owns its store handle and credential service. It holds no
//! other state between calls. Authorization is not checked here; callers
//! go through the auth gate, which checks the session first.

use crate::credentials::{CredentialService, confirm_password};
use crate::record::{
    AdminRecord, NewAdmin, NewStudent, StudentPatch, StudentRecord, validate_text,
    validate_username,
};
use crate::storage::RecordStore;
use crate::{RecordError, RollNumber};
use serde::Serialize;

/// Record counts reported by the status command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub students: usize,
    pub admins: usize,
}

/// Student and admin operations over a store.
#[derive(Debug)]
pub struct RecordManager<S, C> {
    store: S,
    credentials: C,
}

impl<S: RecordStore, C: CredentialService> RecordManager<S, C> {
    /// Create a manager that owns `store`.
    pub fn new(store: S, credentials: C) -> Self {
        Self { store, credentials }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    // =========================================================================
    // STUDENTS
    // =========================================================================

    /// Validate, compute metrics and persist a new student.
    pub fn add_student(&mut self, input: NewStudent) -> Result<StudentRecord, RecordError> {
        if self.store.student_exists(input.roll_number)? {
            return Err(RecordError::DuplicateKey(input.roll_number));
        }
        let record = StudentRecord::new(input)?;
        self.store.create_student(&record)?;

        tracing::info!(
            event = "student_added",
            roll_number = record.roll_number().value(),
            gpa = record.metrics().gpa,
            "Student added"
        );
        Ok(record)
    }

    /// Add several students, each independently.
    ///
    /// Returns one result per input, in order. A failed item does not stop
    /// the rest of the batch.
    pub fn add_students(
        &mut self,
        inputs: Vec<NewStudent>,
    ) -> Vec<Result<StudentRecord, RecordError>> {
        let results: Vec<_> = inputs
            .into_iter()
            .map(|input| {
                let roll_number = input.roll_number;
                let result = self.add_student(input);
                if let Err(e) = &result {
                    tracing::warn!(
                        roll_number = roll_number.value(),
                        error = %e,
                        "Skipped student in batch"
                    );
                }
                result
            })
            .collect();

        let added = results.iter().filter(|r| r.is_ok()).count();
        tracing::info!(added, skipped = results.len() - added, "Batch add finished");
        results
    }

    /// Delete a student. Confirmation is the caller's job.
    pub fn remove_student(&mut self, roll_number: RollNumber) -> Result<(), RecordError> {
        if !self.store.delete_student(roll_number)? {
            return Err(RecordError::NotFound(roll_number));
        }
        tracing::info!(
            event = "student_removed",
            roll_number = roll_number.value(),
            "Student removed"
        );
        Ok(())
    }

    /// Apply a one-field patch to a student and persist the whole record.
    pub fn update_student(
        &mut self,
        roll_number: RollNumber,
        patch: StudentPatch,
    ) -> Result<StudentRecord, RecordError> {
        let mut record = self
            .store
            .fetch_student(roll_number)?
            .ok_or(RecordError::NotFound(roll_number))?;
        let field = patch.field();
        record.apply(patch)?;
        self.store.update_student(&record)?;

        tracing::info!(
            event = "student_updated",
            roll_number = roll_number.value(),
            field,
            "Student updated"
        );
        Ok(record)
    }

    /// Fetch a student for display.
    pub fn generate_report(&self, roll_number: RollNumber) -> Result<StudentRecord, RecordError> {
        self.store
            .fetch_student(roll_number)?
            .ok_or(RecordError::NotFound(roll_number))
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    /// Create a login for an existing student.
    ///
    /// A student signs up once; a second signup for the same roll number is
    /// `InvalidInput`.
    pub fn signup(
        &mut self,
        roll_number: RollNumber,
        username: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<(), RecordError> {
        let username = validate_username(username)?;
        let record = self
            .store
            .fetch_student(roll_number)?
            .ok_or(RecordError::NotFound(roll_number))?;
        if record.has_login() {
            return Err(RecordError::invalid(format!(
                "student {roll_number} has already signed up"
            )));
        }
        if self.store.student_username_exists(&username)? {
            return Err(RecordError::DuplicateUsername(username));
        }
        confirm_password(password, confirmation)?;

        let hash = self.credentials.hash(password)?;
        self.store
            .set_student_credentials(roll_number, &username, &hash)?;

        tracing::info!(
            event = "student_signup",
            roll_number = roll_number.value(),
            username = %username,
            "Student signed up"
        );
        Ok(())
    }

    /// Create an administrator account.
    pub fn add_admin(&mut self, input: NewAdmin) -> Result<AdminRecord, RecordError> {
        let name = validate_text("name", &input.name)?;
        let username = validate_username(&input.username)?;
        if self.store.admin_username_exists(&username)? {
            return Err(RecordError::DuplicateUsername(username));
        }
        confirm_password(&input.password, &input.confirmation)?;

        let hash = self.credentials.hash(&input.password)?;
        let admin = self.store.create_admin(&name, &username, &hash)?;

        tracing::info!(
            event = "admin_added",
            admin_id = admin.id.0,
            username = %admin.username,
            "Admin added"
        );
        Ok(admin)
    }

    /// Create the first administrator of a fresh store.
    ///
    /// Fails with `InvalidInput` once any admin exists.
    pub fn bootstrap_admin(&mut self, input: NewAdmin) -> Result<AdminRecord, RecordError> {
        if self.store.admin_count()? > 0 {
            return Err(RecordError::invalid(
                "an administrator already exists; log in and use add admin instead",
            ));
        }
        self.add_admin(input)
    }

    /// Student and admin counts.
    pub fn status(&self) -> Result<StoreStatus, RecordError> {
        Ok(StoreStatus {
            students: self.store.student_count()?,
            admins: self.store.admin_count()?,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
