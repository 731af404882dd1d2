//! # Persistence Formats
//!
//! Encodings shared by the storage backends:
//! - `marks`: the textual marks blob stored in the `marks` column
//! - `rows`: flat student rows as written by the redb and SQLite backends
//! - `document`: the JSON document written by the file backend
//!
//! These are pure transformations. File and database I/O live in `storage`.

pub mod document;
pub mod marks;
pub mod rows;

pub use document::{FileStudent, StoreDocument};
pub use marks::{decode_marks, encode_marks};
pub use rows::StudentRow;
