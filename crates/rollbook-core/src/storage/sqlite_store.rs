//! # SQLite Record Storage
//!
//! Relational backend (feature `sqlite`). The schema keeps roll numbers and
//! usernames unique through `PRIMARY KEY` and `UNIQUE` constraints, and every
//! write runs inside a transaction that rolls back when dropped on an error
//! path.

use super::RecordStore;
use crate::formats::StudentRow;
use crate::record::{AdminRecord, StudentRecord};
use crate::{AdminId, RecordError, RollNumber};
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS students(
    roll_number INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    dept TEXT NOT NULL,
    year TEXT NOT NULL,
    marks TEXT NOT NULL,
    total INTEGER NOT NULL,
    percentage REAL NOT NULL,
    gpa REAL NOT NULL,
    username TEXT UNIQUE,
    password_hash TEXT
);
CREATE TABLE IF NOT EXISTS admins(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    admin_name TEXT NOT NULL,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);
";

const STUDENT_COLUMNS: &str =
    "roll_number, name, age, dept, year, marks, total, percentage, gpa, username, password_hash";

/// SQLite-backed record store.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

fn read_student_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StudentRow> {
    let total: i64 = row.get(6)?;
    let total = u64::try_from(total)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Integer, Box::new(e)))?;
    Ok(StudentRow {
        roll_number: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        dept: row.get(3)?,
        year: row.get(4)?,
        marks: row.get(5)?,
        total,
        percentage: row.get(7)?,
        gpa: row.get(8)?,
        username: row.get(9)?,
        password_hash: row.get(10)?,
    })
}

fn read_admin_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AdminRecord> {
    let id: i64 = row.get(0)?;
    let id = u64::try_from(id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e)))?;
    Ok(AdminRecord {
        id: AdminId(id),
        name: row.get(1)?,
        username: row.get(2)?,
        password_hash: row.get(3)?,
    })
}

/// Map a failed student write, translating constraint violations.
fn student_write_error(
    err: rusqlite::Error,
    roll_number: RollNumber,
    username: Option<&str>,
) -> RecordError {
    match &err {
        rusqlite::Error::SqliteFailure(code, message)
            if code.code == ErrorCode::ConstraintViolation =>
        {
            let message = message.as_deref().unwrap_or_default();
            match username {
                Some(name) if message.contains("username") => {
                    RecordError::DuplicateUsername(name.to_string())
                }
                _ => RecordError::DuplicateKey(roll_number),
            }
        }
        _ => RecordError::storage(err),
    }
}

impl SqliteStore {
    /// Open or create a database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let conn = Connection::open(path.as_ref()).map_err(RecordError::storage)?;
        tracing::debug!(path = %path.as_ref().display(), "Opened SQLite record store");
        Self::with_connection(conn)
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self, RecordError> {
        let conn = Connection::open_in_memory().map_err(RecordError::storage)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, RecordError> {
        conn.execute_batch(SCHEMA).map_err(RecordError::storage)?;
        Ok(Self { conn })
    }

    fn student_bindings(record: &StudentRecord) -> Result<(StudentRow, i64), RecordError> {
        let row = StudentRow::from_record(record)?;
        let total = i64::try_from(row.total).map_err(RecordError::storage)?;
        Ok((row, total))
    }
}

impl RecordStore for SqliteStore {
    fn create_student(&mut self, record: &StudentRecord) -> Result<(), RecordError> {
        let roll_number = record.roll_number();
        let (row, total) = Self::student_bindings(record)?;

        let tx = self.conn.transaction().map_err(RecordError::storage)?;
        tx.execute(
            &format!(
                "INSERT INTO students({STUDENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                row.roll_number,
                row.name,
                row.age,
                row.dept,
                row.year,
                row.marks,
                total,
                row.percentage,
                row.gpa,
                row.username,
                row.password_hash,
            ],
        )
        .map_err(|e| student_write_error(e, roll_number, record.username()))?;
        tx.commit().map_err(RecordError::storage)?;
        Ok(())
    }

    fn fetch_student(&self, roll_number: RollNumber) -> Result<Option<StudentRecord>, RecordError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE roll_number = ?1"),
                [roll_number.value()],
                read_student_row,
            )
            .optional()
            .map_err(RecordError::storage)?;
        row.map(StudentRow::into_record).transpose()
    }

    fn fetch_student_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StudentRecord>, RecordError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE username = ?1"),
                [username],
                read_student_row,
            )
            .optional()
            .map_err(RecordError::storage)?;
        row.map(StudentRow::into_record).transpose()
    }

    fn update_student(&mut self, record: &StudentRecord) -> Result<(), RecordError> {
        let roll_number = record.roll_number();
        let (row, total) = Self::student_bindings(record)?;

        let tx = self.conn.transaction().map_err(RecordError::storage)?;
        let changed = tx
            .execute(
                "UPDATE students SET name = ?2, age = ?3, dept = ?4, year = ?5, marks = ?6,
                    total = ?7, percentage = ?8, gpa = ?9, username = ?10, password_hash = ?11
                 WHERE roll_number = ?1",
                params![
                    row.roll_number,
                    row.name,
                    row.age,
                    row.dept,
                    row.year,
                    row.marks,
                    total,
                    row.percentage,
                    row.gpa,
                    row.username,
                    row.password_hash,
                ],
            )
            .map_err(|e| student_write_error(e, roll_number, record.username()))?;
        if changed == 0 {
            return Err(RecordError::NotFound(roll_number));
        }
        tx.commit().map_err(RecordError::storage)?;
        Ok(())
    }

    fn delete_student(&mut self, roll_number: RollNumber) -> Result<bool, RecordError> {
        let tx = self.conn.transaction().map_err(RecordError::storage)?;
        let changed = tx
            .execute(
                "DELETE FROM students WHERE roll_number = ?1",
                [roll_number.value()],
            )
            .map_err(RecordError::storage)?;
        tx.commit().map_err(RecordError::storage)?;
        Ok(changed > 0)
    }

    fn student_exists(&self, roll_number: RollNumber) -> Result<bool, RecordError> {
        self.conn
            .query_row(
                "SELECT 1 FROM students WHERE roll_number = ?1",
                [roll_number.value()],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(RecordError::storage)
    }

    fn student_username_exists(&self, username: &str) -> Result<bool, RecordError> {
        self.conn
            .query_row(
                "SELECT 1 FROM students WHERE username = ?1",
                [username],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(RecordError::storage)
    }

    fn set_student_credentials(
        &mut self,
        roll_number: RollNumber,
        username: &str,
        password_hash: &str,
    ) -> Result<(), RecordError> {
        let tx = self.conn.transaction().map_err(RecordError::storage)?;
        let changed = tx
            .execute(
                "UPDATE students SET username = ?2, password_hash = ?3 WHERE roll_number = ?1",
                params![roll_number.value(), username, password_hash],
            )
            .map_err(|e| student_write_error(e, roll_number, Some(username)))?;
        if changed == 0 {
            return Err(RecordError::NotFound(roll_number));
        }
        tx.commit().map_err(RecordError::storage)?;
        Ok(())
    }

    fn list_students(&self) -> Result<Vec<StudentRecord>, RecordError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {STUDENT_COLUMNS} FROM students ORDER BY roll_number"
            ))
            .map_err(RecordError::storage)?;
        let rows = stmt
            .query_map([], read_student_row)
            .map_err(RecordError::storage)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(RecordError::storage)?.into_record()?);
        }
        Ok(records)
    }

    fn student_count(&self) -> Result<usize, RecordError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))
            .map_err(RecordError::storage)?;
        usize::try_from(count).map_err(RecordError::storage)
    }

    fn create_admin(
        &mut self,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminRecord, RecordError> {
        let tx = self.conn.transaction().map_err(RecordError::storage)?;
        tx.execute(
            "INSERT INTO admins(admin_name, username, password_hash) VALUES (?1, ?2, ?3)",
            params![name, username, password_hash],
        )
        .map_err(|e| match &e {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == ErrorCode::ConstraintViolation =>
            {
                RecordError::DuplicateUsername(username.to_string())
            }
            _ => RecordError::storage(e),
        })?;
        let id = u64::try_from(tx.last_insert_rowid()).map_err(RecordError::storage)?;
        tx.commit().map_err(RecordError::storage)?;

        Ok(AdminRecord {
            id: AdminId(id),
            name: name.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    fn fetch_admin(&self, username: &str) -> Result<Option<AdminRecord>, RecordError> {
        self.conn
            .query_row(
                "SELECT id, admin_name, username, password_hash FROM admins WHERE username = ?1",
                [username],
                read_admin_row,
            )
            .optional()
            .map_err(RecordError::storage)
    }

    fn admin_username_exists(&self, username: &str) -> Result<bool, RecordError> {
        Ok(self.fetch_admin(username)?.is_some())
    }

    fn admin_count(&self) -> Result<usize, RecordError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))
            .map_err(RecordError::storage)?;
        usize::try_from(count).map_err(RecordError::storage)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewStudent;

    fn student(roll: u32) -> StudentRecord {
        StudentRecord::new(NewStudent {
            roll_number: RollNumber(roll),
            name: format!("Student {roll}"),
            age: 20,
            dept: "Chemistry".to_string(),
            year: "I".to_string(),
            marks: [("Organic".to_string(), 88)].into_iter().collect(),
        })
        .expect("valid")
    }

    #[test]
    fn primary_key_maps_to_duplicate_key() {
        let mut store = SqliteStore::open_in_memory().expect("open");
        store.create_student(&student(1)).expect("first");
        assert!(matches!(
            store.create_student(&student(1)),
            Err(RecordError::DuplicateKey(RollNumber(1)))
        ));
    }

    #[test]
    fn unique_username_maps_to_duplicate_username() {
        let mut store = SqliteStore::open_in_memory().expect("open");
        store.create_student(&student(1)).expect("one");
        store.create_student(&student(2)).expect("two");
        store
            .set_student_credentials(RollNumber(1), "taken", "h1")
            .expect("signup");

        assert!(matches!(
            store.set_student_credentials(RollNumber(2), "taken", "h2"),
            Err(RecordError::DuplicateUsername(name)) if name == "taken"
        ));
        let first = store
            .fetch_student_by_username("taken")
            .expect("fetch")
            .expect("present");
        assert_eq!(first.roll_number(), RollNumber(1));
        assert_eq!(first.password_hash(), Some("h1"));
    }

    #[test]
    fn marks_column_holds_json_text() {
        let mut store = SqliteStore::open_in_memory().expect("open");
        store.create_student(&student(7)).expect("create");
        let (marks, total): (String, i64) = store
            .conn
            .query_row(
                "SELECT marks, total FROM students WHERE roll_number = 7",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("row");
        assert_eq!(marks, r#"{"Organic":88}"#);
        assert_eq!(total, 88);
    }

    #[test]
    fn admin_ids_autoincrement() {
        let mut store = SqliteStore::open_in_memory().expect("open");
        let first = store.create_admin("A", "a", "h").expect("a");
        let second = store.create_admin("B", "b", "h").expect("b");
        assert_eq!(first.id, AdminId(1));
        assert_eq!(second.id, AdminId(2));
        assert!(matches!(
            store.create_admin("C", "a", "h"),
            Err(RecordError::DuplicateUsername(_))
        ));
        assert_eq!(store.admin_count().expect("count"), 2);
    }
}
