//! # rollbook-core
//!
//! Student record engine for Rollbook - THE LOGIC.
//!
//! This crate holds everything that is not user interface:
//! - Records and their derived metrics (`record`, `metrics`)
//! - Durable storage behind one trait, with four backends (`storage`)
//! - Password hashing (`credentials`)
//! - Business operations (`manager`)
//! - Login, sessions and role enforcement (`auth`, `session`, `command`)
//!
//! ## Constraints
//!
//! - Synchronous and single-threaded: no async, no network
//! - Metrics are always derived from marks, never stored independently
//! - Every store write is atomic per record
//! - Plaintext passwords are hashed immediately and never stored or logged

// =============================================================================
// MODULES
// =============================================================================

pub mod auth;
pub mod command;
pub mod credentials;
pub mod formats;
pub mod manager;
pub mod metrics;
pub mod primitives;
pub mod record;
pub mod session;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{AdminId, AuthError, Marks, RecordError, Role, RollNumber};

// =============================================================================
// RE-EXPORTS: Records and Storage
// =============================================================================

pub use metrics::Metrics;
pub use record::{AdminRecord, NewAdmin, NewStudent, ReportCard, StudentPatch, StudentRecord};
#[cfg(feature = "sqlite")]
pub use storage::SqliteStore;
pub use storage::{JsonFileStore, MemoryStore, RecordStore, RedbStore, StorageBackend};

// =============================================================================
// RE-EXPORTS: Operations
// =============================================================================

pub use auth::{AuthGate, LoginAttempt};
pub use command::{AdminOp, Operation, Outcome, StudentOp};
pub use credentials::{Argon2Credentials, CredentialService, HashCost, confirm_password};
pub use manager::{RecordManager, StoreStatus};
pub use session::{AccessPolicy, Principal, ReportScope, Session};
