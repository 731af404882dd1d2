//! # Student Rows
//!
//! The flat, column-shaped form of a student record, matching the
//! `students` table: marks as a text blob plus the denormalized metrics.
//! The redb backend stores rows postcard-encoded; the SQLite backend maps
//! them column by column.

use super::marks::{decode_marks, encode_marks};
use crate::metrics::Metrics;
use crate::record::StudentRecord;
use crate::{RecordError, RollNumber};
use serde::{Deserialize, Serialize};

/// One row of the `students` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRow {
    pub roll_number: u32,
    pub name: String,
    pub age: u32,
    pub dept: String,
    pub year: String,
    pub marks: String,
    pub total: u64,
    pub percentage: f64,
    pub gpa: f64,
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

impl StudentRow {
    /// Flatten a record into a row.
    pub fn from_record(record: &StudentRecord) -> Result<Self, RecordError> {
        let metrics = record.metrics();
        Ok(Self {
            roll_number: record.roll_number().value(),
            name: record.name().to_string(),
            age: record.age(),
            dept: record.dept().to_string(),
            year: record.year().to_string(),
            marks: encode_marks(record.marks())?,
            total: metrics.total,
            percentage: metrics.percentage,
            gpa: metrics.gpa,
            username: record.username().map(str::to_string),
            password_hash: record.password_hash().map(str::to_string),
        })
    }

    /// Rebuild the record, recomputing metrics from the marks blob.
    pub fn into_record(self) -> Result<StudentRecord, RecordError> {
        let roll_number = RollNumber(self.roll_number);
        let marks = decode_marks(&self.marks)?;
        let record = StudentRecord::restore(
            roll_number,
            self.name,
            self.age,
            self.dept,
            self.year,
            marks,
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

/// Log stored metrics that disagree with the marks they were derived from.
///
/// The recomputed values always win; the warning points at rows written by
/// something other than this crate.
pub(crate) fn warn_if_stale(
    roll_number: RollNumber,
    total: u64,
    percentage: f64,
    gpa: f64,
    computed: Metrics,
) {
    if total != computed.total || percentage != computed.percentage || gpa != computed.gpa {
        tracing::warn!(
            event = "stale_metrics",
            roll_number = roll_number.value(),
            stored_total = total,
            computed_total = computed.total,
            "Stored metrics disagree with marks; using recomputed values"
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewStudent;

    fn record() -> StudentRecord {
        StudentRecord::new(NewStudent {
            roll_number: RollNumber(9),
            name: "Ravi".to_string(),
            age: 21,
            dept: "CSE".to_string(),
            year: "III".to_string(),
            marks: [("DSA".to_string(), 77), ("OS".to_string(), 68)]
                .into_iter()
                .collect(),
        })
        .expect("valid")
    }

    #[test]
    fn row_stores_marks_as_text() {
        let row = StudentRow::from_record(&record()).expect("row");
        assert_eq!(row.marks, r#"{"DSA":77,"OS":68}"#);
        assert_eq!(row.total, 145);
    }

    #[test]
    fn row_survives_postcard() {
        let original = record();
        let row = StudentRow::from_record(&original).expect("row");
        let bytes = postcard::to_allocvec(&row).expect("encode");
        let decoded: StudentRow = postcard::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded.into_record().expect("record"), original);
    }

    #[test]
    fn stale_metrics_are_recomputed() {
        let mut row = StudentRow::from_record(&record()).expect("row");
        row.total = 1;
        row.gpa = 0.0;
        let restored = row.into_record().expect("record");
        assert_eq!(restored.metrics().total, 145);
    }

    #[test]
    fn empty_marks_blob_is_corrupt() {
        let mut row = StudentRow::from_record(&record()).expect("row");
        row.marks = "{}".to_string();
        assert!(matches!(
            row.into_record(),
            Err(RecordError::Serialization(_))
        ));
    }
}
