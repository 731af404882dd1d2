//! # Interactive Shell
//!
//! The menu-driven front end. Menus are static tables of [`MenuEntry`]s;
//! every admin or student action is turned into an [`Operation`] and run
//! through the [`AuthGate`], so the shell never bypasses role checks.
//!
//! ```text
//! Main menu ── Admin login ──> Admin menu (add / remove / update / add admin / report)
//!           ├─ Student login ─> Student menu (report)
//!           ├─ Student signup
//!           └─ Exit
//! ```
//!
//! Record errors end the current action and return to the menu. Closing the
//! input ends the shell.

mod prompt;

pub use prompt::{MenuEntry, PromptError, Prompter};

use crate::error::AppError;
use rollbook_core::primitives::{MAX_BATCH_SIZE, MAX_SUBJECTS};
use rollbook_core::{
    AdminOp, AuthError, AuthGate, CredentialService, Marks, NewAdmin, NewStudent, Operation,
    Outcome, RecordError, RecordManager, RecordStore, ReportScope, Role, RollNumber, Session,
    StudentOp, StudentPatch, StudentRecord, confirm_password,
};
use std::io::{BufRead, Write};

// =============================================================================
// MENU TABLES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainAction {
    AdminLogin,
    StudentLogin,
    Signup,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminAction {
    AddStudents,
    RemoveStudent,
    UpdateStudent,
    AddAdmin,
    ViewReport,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StudentAction {
    ViewReport,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateField {
    Age,
    Marks,
    Year,
}

const MAIN_MENU: &[MenuEntry<MainAction>] = &[
    MenuEntry {
        label: "Admin Login",
        action: MainAction::AdminLogin,
    },
    MenuEntry {
        label: "Student Login",
        action: MainAction::StudentLogin,
    },
    MenuEntry {
        label: "Student Signup",
        action: MainAction::Signup,
    },
    MenuEntry {
        label: "Exit",
        action: MainAction::Exit,
    },
];

const ADMIN_MENU: &[MenuEntry<AdminAction>] = &[
    MenuEntry {
        label: "Add Students",
        action: AdminAction::AddStudents,
    },
    MenuEntry {
        label: "Remove Student",
        action: AdminAction::RemoveStudent,
    },
    MenuEntry {
        label: "Update Student",
        action: AdminAction::UpdateStudent,
    },
    MenuEntry {
        label: "Add New Admin",
        action: AdminAction::AddAdmin,
    },
    MenuEntry {
        label: "View Report Card",
        action: AdminAction::ViewReport,
    },
    MenuEntry {
        label: "Logout",
        action: AdminAction::Logout,
    },
];

const STUDENT_MENU: &[MenuEntry<StudentAction>] = &[
    MenuEntry {
        label: "View Report Card",
        action: StudentAction::ViewReport,
    },
    MenuEntry {
        label: "Logout",
        action: StudentAction::Logout,
    },
];

const UPDATE_MENU: &[MenuEntry<UpdateField>] = &[
    MenuEntry {
        label: "Update Age",
        action: UpdateField::Age,
    },
    MenuEntry {
        label: "Update Marks",
        action: UpdateField::Marks,
    },
    MenuEntry {
        label: "Update Academic Year",
        action: UpdateField::Year,
    },
];

// =============================================================================
// SHELL
// =============================================================================

/// The interactive menu loop over one manager.
pub struct Shell<S, C, R, W> {
    manager: RecordManager<S, C>,
    gate: AuthGate,
    prompt: Prompter<R, W>,
}

impl<S, C, R, W> Shell<S, C, R, W>
where
    S: RecordStore,
    C: CredentialService,
    R: BufRead,
    W: Write,
{
    pub fn new(manager: RecordManager<S, C>, gate: AuthGate, input: R, output: W) -> Self {
        Self {
            manager,
            gate,
            prompt: Prompter::new(input, output),
        }
    }

    /// Run until the user exits or input closes.
    pub fn run(&mut self) -> Result<(), AppError> {
        match self.main_menu() {
            Err(AppError::Prompt(PromptError::Closed)) => {
                tracing::debug!("Input closed; leaving shell");
                Ok(())
            }
            other => other,
        }
    }

    /// Take the manager and output sink back.
    pub fn into_parts(self) -> (RecordManager<S, C>, W) {
        (self.manager, self.prompt.into_output())
    }

    fn main_menu(&mut self) -> Result<(), AppError> {
        loop {
            match self.prompt.choose("--- Student Record Manager ---", MAIN_MENU)? {
                MainAction::AdminLogin => {
                    if let Some(session) = self.login(Role::Admin)? {
                        self.admin_menu(&session)?;
                    }
                }
                MainAction::StudentLogin => {
                    if let Some(session) = self.login(Role::Student)? {
                        self.student_menu(&session)?;
                    }
                }
                MainAction::Signup => self.signup()?,
                MainAction::Exit => {
                    self.prompt.say("Goodbye!")?;
                    return Ok(());
                }
            }
        }
    }

    fn admin_menu(&mut self, session: &Session) -> Result<(), AppError> {
        loop {
            match self.prompt.choose("Admin Options:", ADMIN_MENU)? {
                AdminAction::AddStudents => self.add_students(session)?,
                AdminAction::RemoveStudent => self.remove_student(session)?,
                AdminAction::UpdateStudent => self.update_student(session)?,
                AdminAction::AddAdmin => self.add_admin(session)?,
                AdminAction::ViewReport => {
                    let roll = RollNumber(self.prompt.ask_parsed("Enter roll number: ")?);
                    self.run_op(session, Operation::Admin(AdminOp::ViewReport(roll)))?;
                }
                AdminAction::Logout => {
                    self.prompt.say("Logging out admin...")?;
                    return Ok(());
                }
            }
        }
    }

    fn student_menu(&mut self, session: &Session) -> Result<(), AppError> {
        loop {
            match self.prompt.choose("Student Options:", STUDENT_MENU)? {
                StudentAction::ViewReport => {
                    let scope = self.gate.policy().student_report_scope;
                    let roll = match (scope, session.roll_number()) {
                        (ReportScope::Own, Some(own)) => own,
                        _ => RollNumber(self.prompt.ask_parsed("Enter roll number: ")?),
                    };
                    self.run_op(session, Operation::Student(StudentOp::ViewReport(roll)))?;
                }
                StudentAction::Logout => {
                    self.prompt.say("Logging out student...")?;
                    return Ok(());
                }
            }
        }
    }

    // =========================================================================
    // LOGIN / SIGNUP
    // =========================================================================

    fn login(&mut self, role: Role) -> Result<Option<Session>, AppError> {
        let username = self.prompt.ask_nonempty("Enter username: ")?;
        let mut attempt = match self.gate.begin(self.manager.store(), role, &username) {
            Ok(attempt) => attempt,
            Err(AuthError::UnknownUser { .. }) => {
                self.prompt.say("Username not found.")?;
                return Ok(None);
            }
            Err(e) => {
                self.prompt.say(format_args!("Login failed: {e}"))?;
                return Ok(None);
            }
        };

        loop {
            let password = self.prompt.ask("Enter your password: ")?;
            match attempt.submit(self.manager.credentials(), &password) {
                Ok(session) => {
                    self.prompt.say(format_args!("\nWelcome, {username}."))?;
                    return Ok(Some(session));
                }
                Err(AuthError::IncorrectPassword { attempts_left }) => {
                    self.prompt.say(format_args!(
                        "Incorrect password. {attempts_left} attempt(s) left."
                    ))?;
                }
                Err(AuthError::AttemptsExhausted) => {
                    self.prompt.say("Maximum attempts reached.")?;
                    return Ok(None);
                }
                Err(e) => {
                    self.prompt.say(format_args!("Login failed: {e}"))?;
                    return Ok(None);
                }
            }
        }
    }

    fn signup(&mut self) -> Result<(), AppError> {
        let roll = RollNumber(self.prompt.ask_parsed("Enter your roll number: ")?);
        if !self.manager.store().student_exists(roll)? {
            self.prompt.say("Roll number not found. Please contact admin.")?;
            return Ok(());
        }

        let username = loop {
            let username = self.prompt.ask_nonempty("Enter username: ")?;
            if self.manager.store().student_username_exists(&username)? {
                self.prompt.say("Username already taken. Try another!")?;
            } else {
                break username;
            }
        };
        let (password, confirmation) = self.read_new_password()?;

        match self.manager.signup(roll, &username, &password, &confirmation) {
            Ok(()) => self.prompt.say("Successfully signed up.")?,
            Err(e) => self.report_error(&e)?,
        }
        Ok(())
    }

    /// Ask for a password twice until both match.
    fn read_new_password(&mut self) -> Result<(String, String), AppError> {
        loop {
            let password = self.prompt.ask("Enter new password: ")?;
            let confirmation = self.prompt.ask("Confirm password: ")?;
            match confirm_password(&password, &confirmation) {
                Ok(()) => return Ok((password, confirmation)),
                Err(e) => self.prompt.say(format_args!("{e}. Please try again."))?,
            }
        }
    }

    // =========================================================================
    // ADMIN ACTIONS
    // =========================================================================

    fn add_students(&mut self, session: &Session) -> Result<(), AppError> {
        let count = self.ask_count("Enter the number of students to add: ", MAX_BATCH_SIZE)?;

        let mut batch = Vec::new();
        for _ in 0..count {
            let roll = RollNumber(self.prompt.ask_parsed("Enter roll number: ")?);
            if self.manager.store().student_exists(roll)?
                || batch.iter().any(|s: &NewStudent| s.roll_number == roll)
            {
                self.prompt
                    .say(format_args!("Roll number {roll} already exists. Skipping..."))?;
                continue;
            }

            let name = self.prompt.ask_nonempty("Enter name: ")?;
            let age = self.prompt.ask_parsed("Enter age: ")?;
            let year = self
                .prompt
                .ask_nonempty("Enter academic year (I/II/III/IV): ")?;
            let dept = self.prompt.ask_nonempty("Enter department: ")?;
            let marks = self.read_marks()?;

            batch.push(NewStudent {
                roll_number: roll,
                name,
                age,
                dept,
                year,
                marks,
            });
        }

        if batch.is_empty() {
            return Ok(());
        }
        self.run_op(session, Operation::Admin(AdminOp::AddStudents(batch)))
    }

    fn read_marks(&mut self) -> Result<Marks, AppError> {
        let subjects = self.ask_count("Enter number of subjects: ", MAX_SUBJECTS)?;
        let mut marks = Marks::new();
        for i in 0..subjects {
            let subject = self
                .prompt
                .ask_nonempty(&format!("Enter subject {}: ", i + 1))?;
            let score = self.prompt.ask_parsed("Enter marks: ")?;
            if marks.insert(subject.clone(), score).is_some() {
                self.prompt.say(format_args!(
                    "Subject '{subject}' entered twice; keeping the last score."
                ))?;
            }
        }
        Ok(marks)
    }

    /// Ask for a count until it is at most `max`.
    fn ask_count(&mut self, prompt: &str, max: usize) -> Result<usize, AppError> {
        loop {
            let count: usize = self.prompt.ask_parsed(prompt)?;
            if count <= max {
                return Ok(count);
            }
            self.prompt
                .say(format_args!("Enter a number between 0 and {max}."))?;
        }
    }

    fn remove_student(&mut self, session: &Session) -> Result<(), AppError> {
        let roll = RollNumber(self.prompt.ask_parsed("Enter roll number to remove: ")?);
        if !self.manager.store().student_exists(roll)? {
            self.prompt.say("Student not found.")?;
            return Ok(());
        }
        let prompt =
            format!("Are you sure you want to delete student with roll number {roll}? (y/n): ");
        if !self.prompt.confirm(&prompt)? {
            self.prompt.say("Deletion cancelled.")?;
            return Ok(());
        }
        self.run_op(session, Operation::Admin(AdminOp::RemoveStudent(roll)))
    }

    fn update_student(&mut self, session: &Session) -> Result<(), AppError> {
        let roll = RollNumber(self.prompt.ask_parsed("Enter roll number to update: ")?);
        if !self.manager.store().student_exists(roll)? {
            self.prompt.say("Student not found.")?;
            return Ok(());
        }

        let patch = match self.prompt.choose("Update Options:", UPDATE_MENU)? {
            UpdateField::Age => StudentPatch::Age(self.prompt.ask_parsed("Enter new age: ")?),
            UpdateField::Marks => StudentPatch::Marks(self.read_marks()?),
            UpdateField::Year => StudentPatch::Year(
                self.prompt
                    .ask_nonempty("Enter new academic year (I/II/III/IV): ")?,
            ),
        };
        self.run_op(
            session,
            Operation::Admin(AdminOp::UpdateStudent {
                roll_number: roll,
                patch,
            }),
        )
    }

    fn add_admin(&mut self, session: &Session) -> Result<(), AppError> {
        let name = self.prompt.ask_nonempty("Enter admin name: ")?;
        let username = loop {
            let username = self.prompt.ask_nonempty("Enter username: ")?;
            if self.manager.store().admin_username_exists(&username)? {
                self.prompt.say("Username already taken. Try another!")?;
            } else {
                break username;
            }
        };
        let (password, confirmation) = self.read_new_password()?;

        self.run_op(
            session,
            Operation::Admin(AdminOp::AddAdmin(NewAdmin {
                name,
                username,
                password,
                confirmation,
            })),
        )
    }

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// Run an operation through the gate and print its outcome.
    fn run_op(&mut self, session: &Session, operation: Operation) -> Result<(), AppError> {
        match self.gate.execute(&mut self.manager, session, operation) {
            Ok(outcome) => self.print_outcome(outcome),
            Err(e) => self.report_error(&e),
        }
    }

    fn print_outcome(&mut self, outcome: Outcome) -> Result<(), AppError> {
        match outcome {
            Outcome::Student(record) => self.print_report(&record)?,
            Outcome::Batch(results) => {
                for result in results {
                    match result {
                        Ok(record) => self.prompt.say(format_args!(
                            "Student {} added successfully.",
                            record.roll_number()
                        ))?,
                        Err(e) => self.report_error(&e)?,
                    }
                }
            }
            Outcome::Removed(roll) => self
                .prompt
                .say(format_args!("Student {roll} removed successfully."))?,
            Outcome::Admin(admin) => self.prompt.say(format_args!(
                "Successfully added fellow admin '{}'.",
                admin.username
            ))?,
        }
        Ok(())
    }

    fn print_report(&mut self, record: &StudentRecord) -> Result<(), AppError> {
        let json = record.report_card().to_pretty_json()?;
        self.prompt.say("\n--- Report Card ---")?;
        self.prompt.say(json)?;
        Ok(())
    }

    /// Show a record error. Unrecoverable ones are logged as well.
    fn report_error(&mut self, error: &RecordError) -> Result<(), AppError> {
        if !error.is_recoverable() {
            tracing::error!(error = %error, "Operation failed");
        }
        self.prompt.say(format_args!("Error: {error}"))?;
        Ok(())
    }
}
