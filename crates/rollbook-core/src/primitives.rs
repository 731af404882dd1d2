//! # Fixed Limits
//!
//! Hardcoded runtime constants for the Rollbook CORE.
//!
//! These limits are compiled into the binary and are immutable at runtime.
//! Text limits mirror the `VARCHAR(100)` columns of the relational schema so
//! that every backend accepts exactly the same records.

/// Number of password attempts granted per login.
///
/// The third consecutive failure exhausts the attempt; the session is never
/// granted afterwards, whatever is submitted.
pub const MAX_LOGIN_ATTEMPTS: u8 = 3;

/// Maximum length (in characters) of names, departments, years, subjects
/// and usernames.
pub const MAX_TEXT_LENGTH: usize = 100;

/// Maximum number of subjects in a marks mapping.
pub const MAX_SUBJECTS: usize = 64;

/// Maximum accepted age.
pub const MAX_AGE: u32 = 150;

/// Maximum number of students entered in one batch add.
pub const MAX_BATCH_SIZE: usize = 500;

/// Maximum length of a plaintext password accepted for hashing.
pub const MAX_PASSWORD_LENGTH: usize = 256;

// =============================================================================
// FILE FORMAT
// =============================================================================

/// Format tag written at the top of the JSON file store.
pub const FILE_FORMAT: &str = "rollbook";

/// Current version of the JSON file store document.
///
/// Increment this when making breaking changes to the document layout.
pub const FILE_FORMAT_VERSION: u32 = 1;

/// Maximum size of a JSON store file accepted for loading (64 MB).
///
/// Checked BEFORE deserialization so a corrupted or hostile file cannot
/// exhaust memory.
pub const MAX_FILE_STORE_SIZE: u64 = 64 * 1024 * 1024;
