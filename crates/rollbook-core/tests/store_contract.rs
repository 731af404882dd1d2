//! # Store Contract Tests
//!
//! The same behavioural suite, instantiated once per backend. Persistent
//! backends are opened inside a `tempfile` directory, and the reopen checks
//! close and reopen them to prove the data hit disk.

use rollbook_core::storage::RecordStore;
use rollbook_core::{
    AdminId, JsonFileStore, MemoryStore, NewStudent, RecordError, RedbStore, Role, RollNumber,
    StudentPatch, StudentRecord,
};

fn student(roll: u32, marks: &[(&str, u32)]) -> StudentRecord {
    StudentRecord::new(NewStudent {
        roll_number: RollNumber(roll),
        name: format!("Student {roll}"),
        age: 18,
        dept: "Mathematics".to_string(),
        year: "I".to_string(),
        marks: marks.iter().map(|(s, v)| ((*s).to_string(), *v)).collect(),
    })
    .expect("valid student")
}

// =============================================================================
// CONTRACT
// =============================================================================

fn create_then_fetch_is_identical(store: &mut impl RecordStore) {
    let record = student(1, &[("Math", 80), ("Physics", 90), ("Ünïcode Studies", 71)]);
    store.create_student(&record).expect("create");

    let fetched = store
        .fetch_student(RollNumber(1))
        .expect("fetch")
        .expect("present");
    assert_eq!(fetched, record);
    assert_eq!(fetched.metrics().total, 241);
}

fn duplicate_roll_keeps_original(store: &mut impl RecordStore) {
    let original = student(2, &[("Math", 50)]);
    store.create_student(&original).expect("create");

    let clash = student(2, &[("Math", 99)]);
    assert!(matches!(
        store.create_student(&clash),
        Err(RecordError::DuplicateKey(RollNumber(2)))
    ));
    assert_eq!(
        store.fetch_student(RollNumber(2)).expect("fetch"),
        Some(original)
    );
}

fn update_replaces_whole_record(store: &mut impl RecordStore) {
    let mut record = student(3, &[("Math", 60)]);
    store.create_student(&record).expect("create");

    record
        .apply(StudentPatch::Marks(
            [("Math".to_string(), 100), ("Art".to_string(), 80)]
                .into_iter()
                .collect(),
        ))
        .expect("patch");
    store.update_student(&record).expect("update");

    let fetched = store
        .fetch_student(RollNumber(3))
        .expect("fetch")
        .expect("present");
    assert_eq!(fetched.metrics().total, 180);
    assert_eq!(fetched.metrics().gpa, 9.0);

    let ghost = student(404, &[("Math", 1)]);
    assert!(matches!(
        store.update_student(&ghost),
        Err(RecordError::NotFound(RollNumber(404)))
    ));
}

fn delete_reports_presence(store: &mut impl RecordStore) {
    store
        .create_student(&student(4, &[("Math", 10)]))
        .expect("create");
    assert!(store.student_exists(RollNumber(4)).expect("exists"));
    assert!(store.delete_student(RollNumber(4)).expect("delete"));
    assert!(!store.student_exists(RollNumber(4)).expect("exists"));
    assert!(!store.delete_student(RollNumber(4)).expect("delete again"));
}

fn signup_credentials_are_unique(store: &mut impl RecordStore) {
    store
        .create_student(&student(5, &[("Math", 70)]))
        .expect("create 5");
    store
        .create_student(&student(6, &[("Math", 75)]))
        .expect("create 6");

    store
        .set_student_credentials(RollNumber(5), "five", "hash-five")
        .expect("signup");
    assert!(matches!(
        store.set_student_credentials(RollNumber(6), "five", "hash-six"),
        Err(RecordError::DuplicateUsername(_))
    ));
    assert!(matches!(
        store.set_student_credentials(RollNumber(77), "seventy", "h"),
        Err(RecordError::NotFound(RollNumber(77)))
    ));

    let five = store
        .fetch_student_by_username("five")
        .expect("fetch")
        .expect("present");
    assert_eq!(five.roll_number(), RollNumber(5));
    let six = store
        .fetch_student(RollNumber(6))
        .expect("fetch")
        .expect("present");
    assert!(!six.has_login());

    assert_eq!(
        store
            .fetch_password_hash(Role::Student, "five")
            .expect("hash"),
        Some("hash-five".to_string())
    );
    assert_eq!(
        store.fetch_password_hash(Role::Admin, "five").expect("hash"),
        None
    );
}

fn admins_get_sequential_ids(store: &mut impl RecordStore) {
    assert_eq!(store.admin_count().expect("count"), 0);
    let first = store.create_admin("First", "first", "h1").expect("first");
    let second = store.create_admin("Second", "second", "h2").expect("second");
    assert_eq!(first.id, AdminId(1));
    assert_eq!(second.id, AdminId(2));

    assert!(matches!(
        store.create_admin("Dup", "first", "h3"),
        Err(RecordError::DuplicateUsername(_))
    ));
    assert_eq!(store.admin_count().expect("count"), 2);
    assert!(store.admin_username_exists("second").expect("exists"));
    assert_eq!(
        store.fetch_admin("first").expect("fetch"),
        Some(first)
    );
    assert_eq!(
        store.fetch_password_hash(Role::Admin, "second").expect("hash"),
        Some("h2".to_string())
    );
}

fn listing_is_ordered(store: &mut impl RecordStore) {
    for roll in [30, 10, 20] {
        store
            .create_student(&student(roll, &[("Math", roll)]))
            .expect("create");
    }
    let rolls: Vec<u32> = store
        .list_students()
        .expect("list")
        .iter()
        .map(|s| s.roll_number().value())
        .collect();
    assert_eq!(rolls, vec![10, 20, 30]);
}

fn count_tracks_creates_and_deletes(store: &mut impl RecordStore) {
    assert_eq!(store.student_count().expect("count"), 0);
    for roll in [11, 12] {
        store
            .create_student(&student(roll, &[("Math", 40)]))
            .expect("create");
    }
    assert_eq!(store.student_count().expect("count"), 2);

    assert!(store.delete_student(RollNumber(11)).expect("delete"));
    assert_eq!(store.student_count().expect("count"), 1);
}

macro_rules! contract_suite {
    ($module:ident, $open:expr) => {
        mod $module {
            use super::*;

            #[test]
            fn create_then_fetch() {
                let dir = tempfile::tempdir().expect("tempdir");
                create_then_fetch_is_identical(&mut $open(dir.path()));
            }

            #[test]
            fn duplicate_roll() {
                let dir = tempfile::tempdir().expect("tempdir");
                duplicate_roll_keeps_original(&mut $open(dir.path()));
            }

            #[test]
            fn update() {
                let dir = tempfile::tempdir().expect("tempdir");
                update_replaces_whole_record(&mut $open(dir.path()));
            }

            #[test]
            fn delete() {
                let dir = tempfile::tempdir().expect("tempdir");
                delete_reports_presence(&mut $open(dir.path()));
            }

            #[test]
            fn signup_uniqueness() {
                let dir = tempfile::tempdir().expect("tempdir");
                signup_credentials_are_unique(&mut $open(dir.path()));
            }

            #[test]
            fn admins() {
                let dir = tempfile::tempdir().expect("tempdir");
                admins_get_sequential_ids(&mut $open(dir.path()));
            }

            #[test]
            fn ordering() {
                let dir = tempfile::tempdir().expect("tempdir");
                listing_is_ordered(&mut $open(dir.path()));
            }

            #[test]
            fn counting() {
                let dir = tempfile::tempdir().expect("tempdir");
                count_tracks_creates_and_deletes(&mut $open(dir.path()));
            }
        }
    };
}

fn open_memory(_: &std::path::Path) -> MemoryStore {
    MemoryStore::new()
}

fn open_file(dir: &std::path::Path) -> JsonFileStore {
    JsonFileStore::open(dir.join("records.json")).expect("open file store")
}

fn open_redb(dir: &std::path::Path) -> RedbStore {
    RedbStore::open(dir.join("records.redb")).expect("open redb store")
}

contract_suite!(memory, open_memory);
contract_suite!(file, open_file);
contract_suite!(redb, open_redb);

#[cfg(feature = "sqlite")]
fn open_sqlite(dir: &std::path::Path) -> rollbook_core::SqliteStore {
    rollbook_core::SqliteStore::open(dir.join("records.sqlite3")).expect("open sqlite store")
}

#[cfg(feature = "sqlite")]
contract_suite!(sqlite, open_sqlite);

// =============================================================================
// REOPEN
// =============================================================================

fn survives_reopen<S: RecordStore>(open: impl Fn() -> S) {
    let record = student(8, &[("Math", 88), ("Biology", 67)]);
    {
        let mut store = open();
        store.create_student(&record).expect("create");
        store
            .set_student_credentials(RollNumber(8), "eight", "hash8")
            .expect("signup");
        store.create_admin("Head", "head", "h").expect("admin");
    }

    let mut store = open();
    let fetched = store
        .fetch_student_by_username("eight")
        .expect("fetch")
        .expect("present");
    assert_eq!(fetched.marks(), record.marks());
    assert_eq!(fetched.metrics(), record.metrics());
    assert_eq!(
        store.create_admin("Next", "next", "h").expect("admin").id,
        AdminId(2)
    );
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    survives_reopen(|| open_file(dir.path()));
}

#[test]
fn redb_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    survives_reopen(|| open_redb(dir.path()));
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    survives_reopen(|| open_sqlite(dir.path()));
}

// =============================================================================
// STORAGE FAULTS
// =============================================================================

#[test]
fn file_store_write_fault_keeps_prior_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sub = dir.path().join("sub");
    std::fs::create_dir(&sub).expect("mkdir");
    let mut store = open_file(&sub);
    store
        .create_student(&student(1, &[("Math", 80)]))
        .expect("create 1");

    std::fs::remove_dir_all(&sub).expect("remove dir");
    assert!(matches!(
        store.create_student(&student(2, &[("Math", 90)])),
        Err(RecordError::StorageUnavailable(_))
    ));

    assert!(!store.student_exists(RollNumber(2)).expect("exists 2"));
    assert!(store.student_exists(RollNumber(1)).expect("exists 1"));
    assert_eq!(store.student_count().expect("count"), 1);
}
