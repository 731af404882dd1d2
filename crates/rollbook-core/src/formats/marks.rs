//! # Marks Blob
//!
//! Marks are persisted as a JSON object (`{"Math":80,"Physics":90}`).
//! Because `Marks` is a `BTreeMap`, the encoding is canonical: subjects are
//! always written in sorted order and `decode(encode(m)) == m`.

use crate::{Marks, RecordError};

/// Encode marks into the textual column value.
pub fn encode_marks(marks: &Marks) -> Result<String, RecordError> {
    serde_json::to_string(marks).map_err(RecordError::serialization)
}

/// Decode the textual column value back into marks.
///
/// Rejects anything that is not an object of subject -> non-negative integer.
pub fn decode_marks(blob: &str) -> Result<Marks, RecordError> {
    serde_json::from_str(blob).map_err(RecordError::serialization)
}

// =============================================================================
// TESTS
// =============================================================================
