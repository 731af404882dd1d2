//! # Shell Tests
//!
//! Drive the interactive menus with scripted input over an in-memory store.

use rollbook::shell::Shell;
use rollbook_core::primitives::MAX_BATCH_SIZE;
use rollbook_core::{
    AccessPolicy, Argon2Credentials, AuthGate, HashCost, MemoryStore, NewAdmin, NewStudent,
    RecordManager, RecordStore, ReportScope, RollNumber,
};
use std::io::Cursor;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

type TestManager = RecordManager<MemoryStore, Argon2Credentials>;

/// Main menu: admin login with the bootstrapped account.
const ADMIN_LOGIN: &[&str] = &["1", "admin", "secret123"];

/// Admin menu: logout, then main menu: exit.
const LOGOUT_AND_EXIT: &[&str] = &["6", "4"];

fn manager() -> TestManager {
    let credentials = Argon2Credentials::new(HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("params");
    let mut manager = RecordManager::new(MemoryStore::new(), credentials);
    manager
        .bootstrap_admin(NewAdmin {
            name: "Head".to_string(),
            username: "admin".to_string(),
            password: "secret123".to_string(),
            confirmation: "secret123".to_string(),
        })
        .expect("bootstrap");
    manager
        .add_student(NewStudent {
            roll_number: RollNumber(1),
            name: "Nila".to_string(),
            age: 20,
            dept: "ECE".to_string(),
            year: "III".to_string(),
            marks: [("Math".to_string(), 80), ("Physics".to_string(), 90)]
                .into_iter()
                .collect(),
        })
        .expect("student");
    manager
}

/// Feed the steps' input lines to a shell and return the manager and
/// everything printed.
fn run_script(
    manager: TestManager,
    policy: AccessPolicy,
    steps: &[&[&str]],
) -> (TestManager, String) {
    let mut input = steps.concat().join("\n");
    input.push('\n');
    let mut shell = Shell::new(
        manager,
        AuthGate::new(policy),
        Cursor::new(input.into_bytes()),
        Vec::new(),
    );
    shell.run().expect("shell");
    let (manager, output) = shell.into_parts();
    (manager, String::from_utf8(output).expect("utf8"))
}

// =============================================================================
// ADMIN FLOWS
// =============================================================================

#[test]
fn admin_adds_student_and_views_report() {
    let steps: &[&[&str]] = &[
        ADMIN_LOGIN,
        &["1", "1", "7", "Asha", "19", "II", "CSE"],
        &["2", "Math", "90", "Physics", "70"],
        &["5", "7"],
        LOGOUT_AND_EXIT,
    ];
    let (manager, out) = run_script(manager(), AccessPolicy::default(), steps);

    assert!(out.contains("Welcome, admin."));
    assert!(out.contains("Student 7 added successfully."));
    assert!(out.contains("--- Report Card ---"));
    assert!(out.contains("\"total\": 160"));
    assert!(out.contains("\"gpa\": 8.0"));
    assert!(out.contains("Logging out admin..."));
    assert!(out.contains("Goodbye!"));

    let stored = manager
        .store()
        .fetch_student(RollNumber(7))
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.metrics().total, 160);
}

#[test]
fn existing_roll_is_skipped_in_batch() {
    let steps: &[&[&str]] = &[
        ADMIN_LOGIN,
        &["1", "2", "1"],
        &["8", "Ravi", "21", "I", "MECH", "1", "Drawing", "55"],
        LOGOUT_AND_EXIT,
    ];
    let (manager, out) = run_script(manager(), AccessPolicy::default(), steps);

    assert!(out.contains("Roll number 1 already exists. Skipping..."));
    assert!(out.contains("Student 8 added successfully."));
    assert_eq!(manager.status().expect("status").students, 2);
}

#[test]
fn oversized_batch_count_is_asked_again() {
    let too_many = (MAX_BATCH_SIZE + 1).to_string();
    let huge = usize::MAX.to_string();
    let steps: &[&[&str]] = &[
        ADMIN_LOGIN,
        &["1", huge.as_str(), too_many.as_str(), "99999999999999999999999", "0"],
        LOGOUT_AND_EXIT,
    ];
    let (manager, out) = run_script(manager(), AccessPolicy::default(), steps);

    let bound = format!("Enter a number between 0 and {MAX_BATCH_SIZE}.");
    assert_eq!(out.matches(bound.as_str()).count(), 2);
    assert!(out.contains("'99999999999999999999999' is not a valid number."));
    assert!(out.contains("Goodbye!"));
    assert_eq!(manager.status().expect("status").students, 1);
}

#[test]
fn remove_asks_for_confirmation() {
    let steps: &[&[&str]] = &[
        ADMIN_LOGIN,
        &["2", "1", "n"],
        &["2", "1", "y"],
        &["2", "1"],
        LOGOUT_AND_EXIT,
    ];
    let (manager, out) = run_script(manager(), AccessPolicy::default(), steps);

    assert!(out.contains("Deletion cancelled."));
    assert!(out.contains("Student 1 removed successfully."));
    assert!(out.contains("Student not found."));
    assert!(!manager.store().student_exists(RollNumber(1)).expect("exists"));
}

#[test]
fn update_marks_recomputes_metrics() {
    let steps: &[&[&str]] = &[
        ADMIN_LOGIN,
        &["3", "1", "2", "1", "Math", "100"],
        &["3", "1", "1", "30"],
        LOGOUT_AND_EXIT,
    ];
    let (manager, _) = run_script(manager(), AccessPolicy::default(), steps);

    let record = manager
        .store()
        .fetch_student(RollNumber(1))
        .expect("fetch")
        .expect("present");
    assert_eq!(record.age(), 30);
    assert_eq!(record.metrics().total, 100);
    assert_eq!(record.metrics().gpa, 10.0);
}

#[test]
fn add_admin_retries_taken_username_and_mismatch() {
    let steps: &[&[&str]] = &[
        ADMIN_LOGIN,
        &["4", "Deputy", "admin", "deputy"],
        &["pw1", "pw2", "pw1", "pw1"],
        LOGOUT_AND_EXIT,
    ];
    let (manager, out) = run_script(manager(), AccessPolicy::default(), steps);

    assert!(out.contains("Username already taken. Try another!"));
    assert!(out.contains("Please try again."));
    assert!(out.contains("Successfully added fellow admin 'deputy'."));
    let exists = manager.store().admin_username_exists("deputy");
    assert!(exists.expect("exists"));
}

// =============================================================================
// LOGIN FLOWS
// =============================================================================

#[test]
fn exhausted_login_returns_to_main_menu() {
    let steps: &[&[&str]] = &[&["1", "admin", "a", "b", "c"], &["4"]];
    let (_, out) = run_script(manager(), AccessPolicy::default(), steps);

    assert!(out.contains("Incorrect password. 2 attempt(s) left."));
    assert!(out.contains("Incorrect password. 1 attempt(s) left."));
    assert!(out.contains("Maximum attempts reached."));
    assert!(!out.contains("Welcome"));
    assert!(out.contains("Goodbye!"));
}

#[test]
fn unknown_user_is_reported() {
    let steps: &[&[&str]] = &[&["2", "ghost"], &["4"]];
    let (_, out) = run_script(manager(), AccessPolicy::default(), steps);
    assert!(out.contains("Username not found."));
}

#[test]
fn closed_input_ends_shell_cleanly() {
    let steps: &[&[&str]] = &[&["1", "admin"]];
    let (_, out) = run_script(manager(), AccessPolicy::default(), steps);
    assert!(!out.contains("Goodbye!"));
}

// =============================================================================
// STUDENT FLOWS
// =============================================================================

#[test]
fn signup_then_view_own_report() {
    let steps: &[&[&str]] = &[
        &["3", "1", "nila", "pw1", "pw2", "pw1", "pw1"],
        &["2", "nila", "wrong", "pw1"],
        &["1", "2", "4"],
    ];
    let (_, out) = run_script(manager(), AccessPolicy::default(), steps);

    assert!(out.contains("Please try again."));
    assert!(out.contains("Successfully signed up."));
    assert!(out.contains("Incorrect password. 2 attempt(s) left."));
    assert!(out.contains("Welcome, nila."));
    assert!(out.contains("\"roll_no\": 1"));
    assert!(out.contains("Logging out student..."));
}

#[test]
fn signup_for_missing_roll_is_refused() {
    let steps: &[&[&str]] = &[&["3", "99"], &["4"]];
    let (_, out) = run_script(manager(), AccessPolicy::default(), steps);
    assert!(out.contains("Roll number not found. Please contact admin."));
}

#[test]
fn student_scope_any_asks_for_roll() {
    let mut manager = manager();
    manager
        .signup(RollNumber(1), "nila", "pw1", "pw1")
        .expect("signup");
    manager
        .add_student(NewStudent {
            roll_number: RollNumber(2),
            name: "Arun".to_string(),
            age: 22,
            dept: "EEE".to_string(),
            year: "IV".to_string(),
            marks: [("Circuits".to_string(), 60)].into_iter().collect(),
        })
        .expect("student");

    let policy = AccessPolicy {
        student_report_scope: ReportScope::Any,
    };
    let steps: &[&[&str]] = &[&["2", "nila", "pw1"], &["1", "2"], &["2", "4"]];
    let (_, out) = run_script(manager, policy, steps);

    assert!(out.contains("Enter roll number: "));
    assert!(out.contains("\"name\": \"Arun\""));
}
