//! # Record Types
//!
//! Student and administrator records plus the inputs that create or mutate
//! them.
//!
//! A `StudentRecord` keeps its marks and derived metrics private: the only
//! ways to change marks are [`StudentRecord::new`] and
//! [`StudentRecord::set_marks`], and both recompute the metrics, so total,
//! percentage and GPA can never drift from the marks they describe.

use crate::metrics::{self, Metrics};
use crate::primitives::{MAX_AGE, MAX_SUBJECTS, MAX_TEXT_LENGTH};
use crate::{AdminId, Marks, RecordError, RollNumber};
use serde::{Deserialize, Serialize};

// =============================================================================
// STUDENT RECORD
// =============================================================================

/// A student's record.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    roll_number: RollNumber,
    name: String,
    age: u32,
    dept: String,
    year: String,
    marks: Marks,
    metrics: Metrics,
    username: Option<String>,
    password_hash: Option<String>,
}

impl StudentRecord {
    /// Validate a new student and compute its metrics.
    pub fn new(input: NewStudent) -> Result<Self, RecordError> {
        let NewStudent {
            roll_number,
            name,
            age,
            dept,
            year,
            marks,
        } = input;

        let name = validate_text("name", &name)?;
        let dept = validate_text("department", &dept)?;
        let year = validate_text("academic year", &year)?;
        validate_age(age)?;
        validate_marks(&marks)?;
        let metrics = metrics::compute(&marks)?;

        Ok(Self {
            roll_number,
            name,
            age,
            dept,
            year,
            marks,
            metrics,
            username: None,
            password_hash: None,
        })
    }

    /// Rebuild a record read back from storage.
    ///
    /// Metrics are recomputed from the decoded marks rather than trusted.
    pub(crate) fn restore(
        roll_number: RollNumber,
        name: String,
        age: u32,
        dept: String,
        year: String,
        marks: Marks,
        username: Option<String>,
        password_hash: Option<String>,
    ) -> Result<Self, RecordError> {
        let metrics = metrics::compute(&marks).map_err(|e| {
            RecordError::Serialization(format!("stored student {roll_number}: {e}"))
        })?;
        Ok(Self {
            roll_number,
            name,
            age,
            dept,
            year,
            marks,
            metrics,
            username,
            password_hash,
        })
    }

    #[must_use]
    pub fn roll_number(&self) -> RollNumber {
        self.roll_number
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn age(&self) -> u32 {
        self.age
    }

    #[must_use]
    pub fn dept(&self) -> &str {
        &self.dept
    }

    #[must_use]
    pub fn year(&self) -> &str {
        &self.year
    }

    #[must_use]
    pub fn marks(&self) -> &Marks {
        &self.marks
    }

    #[must_use]
    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Username chosen at signup, if the student has signed up.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    /// Whether the student has signed up for a login.
    #[must_use]
    pub fn has_login(&self) -> bool {
        self.username.is_some() && self.password_hash.is_some()
    }

    /// Replace the marks and recompute metrics in the same step.
    ///
    /// On error the record is left unchanged.
    pub fn set_marks(&mut self, marks: Marks) -> Result<(), RecordError> {
        validate_marks(&marks)?;
        let metrics = metrics::compute(&marks)?;
        self.marks = marks;
        self.metrics = metrics;
        Ok(())
    }

    /// Apply a single-field update.
    pub fn apply(&mut self, patch: StudentPatch) -> Result<(), RecordError> {
        match patch {
            StudentPatch::Age(age) => {
                validate_age(age)?;
                self.age = age;
            }
            StudentPatch::Marks(marks) => self.set_marks(marks)?,
            StudentPatch::Year(year) => self.year = validate_text("academic year", &year)?,
        }
        Ok(())
    }

    /// Attach signup credentials.
    pub(crate) fn set_credentials(&mut self, username: String, password_hash: String) {
        self.username = Some(username);
        self.password_hash = Some(password_hash);
    }

    /// The report-card view of this record.
    #[must_use]
    pub fn report_card(&self) -> ReportCard {
        ReportCard {
            roll_no: self.roll_number,
            name: self.name.clone(),
            age: self.age,
            dept: self.dept.clone(),
            year: self.year.clone(),
            marks: self.marks.clone(),
            total: self.metrics.total,
            percentage: self.metrics.percentage,
            gpa: self.metrics.gpa,
        }
    }
}

// =============================================================================
// STUDENT INPUTS
// =============================================================================

/// Input for creating a student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub roll_number: RollNumber,
    pub name: String,
    pub age: u32,
    pub dept: String,
    pub year: String,
    pub marks: Marks,
}

/// One-field update applied by the admin update operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentPatch {
    Age(u32),
    /// Replaces the whole marks mapping; metrics are recomputed.
    Marks(Marks),
    Year(String),
}

impl StudentPatch {
    /// Short name of the patched field, for logs.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Age(_) => "age",
            Self::Marks(_) => "marks",
            Self::Year(_) => "year",
        }
    }
}

// =============================================================================
// REPORT CARD
// =============================================================================

/// The JSON shape used to render report cards.
///
/// Field names follow the persisted record layout (`roll_no`, `dept`...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCard {
    pub roll_no: RollNumber,
    pub name: String,
    pub age: u32,
    pub dept: String,
    pub year: String,
    pub marks: Marks,
    pub total: u64,
    pub percentage: f64,
    pub gpa: f64,
}

impl ReportCard {
    /// Pretty-printed JSON, as shown to the student.
    pub fn to_pretty_json(&self) -> Result<String, RecordError> {
        serde_json::to_string_pretty(self).map_err(RecordError::serialization)
    }
}

// =============================================================================
// ADMIN RECORD
// =============================================================================

/// An administrator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub id: AdminId,
    pub name: String,
    pub username: String,
    pub password_hash: String,
}

/// Input for creating an administrator.
///
/// The plaintext password never leaves the manager; only its hash is stored.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAdmin {
    pub name: String,
    pub username: String,
    pub password: String,
    pub confirmation: String,
}

impl std::fmt::Debug for NewAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdmin")
            .field("name", &self.name)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Trim and bound a free-text field.
pub(crate) fn validate_text(field: &str, value: &str) -> Result<String, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::invalid(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        return Err(RecordError::invalid(format!(
            "{field} exceeds {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Usernames are bounded text without whitespace.
pub(crate) fn validate_username(username: &str) -> Result<String, RecordError> {
    let username = validate_text("username", username)?;
    if username.chars().any(char::is_whitespace) {
        return Err(RecordError::invalid("username must not contain whitespace"));
    }
    Ok(username)
}

fn validate_age(age: u32) -> Result<(), RecordError> {
    if age == 0 || age > MAX_AGE {
        return Err(RecordError::invalid(format!(
            "age must be between 1 and {MAX_AGE}"
        )));
    }
    Ok(())
}

fn validate_marks(marks: &Marks) -> Result<(), RecordError> {
    if marks.len() > MAX_SUBJECTS {
        return Err(RecordError::invalid(format!(
            "at most {MAX_SUBJECTS} subjects are allowed"
        )));
    }
    for subject in marks.keys() {
        if subject.trim().is_empty() {
            return Err(RecordError::invalid("subject name must not be empty"));
        }
        if subject.chars().count() > MAX_TEXT_LENGTH {
            return Err(RecordError::invalid(format!(
                "subject '{subject}' exceeds {MAX_TEXT_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
