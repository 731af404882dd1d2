//! # File Store Document
//!
//! The JSON layout written by the file backend:
//!
//! ```json
//! {
//!   "format": "rollbook",
//!   "version": 1,
//!   "next_admin_id": 2,
//!   "students": [ { "roll_no": 1, "name": "...", "marks": {"Math": 80}, ... } ],
//!   "admins": [ { "id": 1, "name": "...", "username": "...", "password_hash": "..." } ]
//! }
//! ```
//!
//! Loading also accepts the older layout: a bare array of student objects
//! (`Student.json`), which carries no admins and no credentials.

use super::rows::warn_if_stale;
use crate::primitives::{FILE_FORMAT, FILE_FORMAT_VERSION};
use crate::record::{AdminRecord, StudentRecord};
use crate::{Marks, RecordError, RollNumber};
use serde::{Deserialize, Serialize};

/// A student as stored in the JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStudent {
    pub roll_no: u32,
    pub name: String,
    pub age: u32,
    pub dept: String,
    pub year: String,
    pub marks: Marks,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub gpa: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl FileStudent {
    #[must_use]
    pub fn from_record(record: &StudentRecord) -> Self {
        let metrics = record.metrics();
        Self {
            roll_no: record.roll_number().value(),
            name: record.name().to_string(),
            age: record.age(),
            dept: record.dept().to_string(),
            year: record.year().to_string(),
            marks: record.marks().clone(),
            total: metrics.total,
            percentage: metrics.percentage,
            gpa: metrics.gpa,
            username: record.username().map(str::to_string),
            password_hash: record.password_hash().map(str::to_string),
        }
    }

    pub fn into_record(self) -> Result<StudentRecord, RecordError> {
        let roll_number = RollNumber(self.roll_no);
        let record = StudentRecord::restore(
            roll_number,
            self.name,
            self.age,
            self.dept,
            self.year,
            self.marks,
            self.username,
            self.password_hash,
        )?;
        warn_if_stale(
            roll_number,
            self.total,
            self.percentage,
            self.gpa,
            record.metrics(),
        );
        Ok(record)
    }
}

/// The whole file store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub format: String,
    pub version: u32,
    pub next_admin_id: u64,
    pub students: Vec<FileStudent>,
    pub admins: Vec<AdminRecord>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            format: FILE_FORMAT.to_string(),
            version: FILE_FORMAT_VERSION,
            next_admin_id: 1,
            students: Vec::new(),
            admins: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FileContents {
    Document(StoreDocument),
    Legacy(Vec<FileStudent>),
}

impl StoreDocument {
    /// Validate the format tag and version.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.format != FILE_FORMAT {
            return Err(RecordError::Serialization(format!(
                "Unknown file format '{}'",
                self.format
            )));
        }
        if self.version != FILE_FORMAT_VERSION {
            return Err(RecordError::Serialization(format!(
                "Unsupported version: {} (expected {})",
                self.version, FILE_FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Parse a document, accepting the legacy bare-array layout.
    pub fn from_json(bytes: &[u8]) -> Result<Self, RecordError> {
        let contents: FileContents =
            serde_json::from_slice(bytes).map_err(RecordError::serialization)?;
        match contents {
            FileContents::Document(doc) => {
                doc.validate()?;
                Ok(doc)
            }
            FileContents::Legacy(students) => {
                tracing::info!(
                    students = students.len(),
                    "Loaded legacy student array; it will be rewritten in the current format"
                );
                Ok(Self {
                    students,
                    ..Self::default()
                })
            }
        }
    }

    /// Pretty-printed JSON, four-space indented like the legacy file.
    pub fn to_json(&self) -> Result<Vec<u8>, RecordError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)
            .map_err(RecordError::serialization)?;
        Ok(out)
    }
}

// =============================================================================
// TESTS
// =============================================================================
