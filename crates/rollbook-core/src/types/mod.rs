//! # Core Type Definitions
//!
//! This module contains the shared types of the Rollbook CORE:
//! - Record identifiers (`RollNumber`, `AdminId`)
//! - Roles (`Role`)
//! - The marks mapping (`Marks`)
//! - Error types (`RecordError`, `AuthError`)
//!
//! ## Determinism Guarantees
//!
//! Identifiers implement `Ord` and marks use `BTreeMap`, so iteration order
//! and encoded forms never depend on insertion order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique integer identifier of a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollNumber(pub u32);

impl RollNumber {
    /// Get the raw roll number.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RollNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of an administrator record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminId(pub u64);

impl fmt::Display for AdminId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ROLES
// =============================================================================

/// The two fixed roles that can hold a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    /// Lowercase name used in logs and config.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// MARKS
// =============================================================================

/// Subject name -> score.
///
/// `BTreeMap` keeps subjects unique and ordered, so the encoded blob is
/// canonical and two equal mappings always encode identically.
pub type Marks = BTreeMap<String, u32>;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors produced by record operations and storage backends.
///
/// - No silent failures
/// - Validation problems are returned, never panicked on
/// - `StorageUnavailable` aborts the current operation only
#[derive(Debug, Error)]
pub enum RecordError {
    /// Input failed validation (empty marks, blank name, bad number...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A student with this roll number already exists.
    #[error("Roll number {0} already exists")]
    DuplicateKey(RollNumber),

    /// The username is already taken in the relevant table.
    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    /// No student with this roll number.
    #[error("Student {0} not found")]
    NotFound(RollNumber),

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// The session's role may not run this operation.
    #[error("{role} session may not {operation}")]
    Forbidden {
        role: Role,
        operation: &'static str,
    },

    /// Password hashing failed.
    #[error("Credential error: {0}")]
    Credential(String),

    /// Stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backing store could not be reached or refused the write.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl RecordError {
    /// Whether the caller can reasonably retry with different input.
    ///
    /// Storage, serialization and credential failures are not recoverable
    /// by re-prompting.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::DuplicateKey(_)
                | Self::DuplicateUsername(_)
                | Self::NotFound(_)
                | Self::PasswordMismatch
                | Self::Forbidden { .. }
        )
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn storage(err: impl fmt::Display) -> Self {
        Self::StorageUnavailable(err.to_string())
    }

    pub(crate) fn serialization(err: impl fmt::Display) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors produced while authenticating.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No account with this username for the requested role.
    #[error("Unknown {role} username '{username}'")]
    UnknownUser { role: Role, username: String },

    /// The password did not verify; some attempts remain.
    #[error("Incorrect password, {attempts_left} attempt(s) left")]
    IncorrectPassword { attempts_left: u8 },

    /// Every attempt of this login has been used.
    #[error("Maximum login attempts reached")]
    AttemptsExhausted,

    /// The store failed while looking up the account.
    #[error(transparent)]
    Record(#[from] RecordError),
}

// =============================================================================
// TESTS
// =============================================================================
