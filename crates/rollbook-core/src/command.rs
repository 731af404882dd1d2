//! # Operations
//!
//! Everything a session can ask the manager to do, split by the role that
//! may run it. The auth gate authorizes an [`Operation`] and then runs it
//! against a [`RecordManager`].

use crate::credentials::CredentialService;
use crate::manager::RecordManager;
use crate::record::{AdminRecord, NewAdmin, NewStudent, StudentPatch, StudentRecord};
use crate::storage::RecordStore;
use crate::{RecordError, RollNumber};

/// Operations reserved for administrators.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminOp {
    AddStudent(NewStudent),
    AddStudents(Vec<NewStudent>),
    RemoveStudent(RollNumber),
    UpdateStudent {
        roll_number: RollNumber,
        patch: StudentPatch,
    },
    AddAdmin(NewAdmin),
    ViewReport(RollNumber),
}

/// Operations open to students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentOp {
    ViewReport(RollNumber),
}

/// A request from an authenticated session.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Admin(AdminOp),
    Student(StudentOp),
}

impl Operation {
    /// Short name, used in logs and `Forbidden` errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Admin(op) => match op {
                AdminOp::AddStudent(_) => "add student",
                AdminOp::AddStudents(_) => "add students",
                AdminOp::RemoveStudent(_) => "remove student",
                AdminOp::UpdateStudent { .. } => "update student",
                AdminOp::AddAdmin(_) => "add admin",
                AdminOp::ViewReport(_) => "view report",
            },
            Self::Student(StudentOp::ViewReport(_)) => "view own report",
        }
    }
}

/// What an operation produced.
#[derive(Debug)]
pub enum Outcome {
    /// A created, updated or fetched student.
    Student(StudentRecord),
    /// Per-item results of a batch add, in input order.
    Batch(Vec<Result<StudentRecord, RecordError>>),
    Removed(RollNumber),
    Admin(AdminRecord),
}

impl AdminOp {
    pub(crate) fn run<S: RecordStore, C: CredentialService>(
        self,
        manager: &mut RecordManager<S, C>,
    ) -> Result<Outcome, RecordError> {
        match self {
            Self::AddStudent(input) => manager.add_student(input).map(Outcome::Student),
            Self::AddStudents(inputs) => Ok(Outcome::Batch(manager.add_students(inputs))),
            Self::RemoveStudent(roll_number) => manager
                .remove_student(roll_number)
                .map(|()| Outcome::Removed(roll_number)),
            Self::UpdateStudent { roll_number, patch } => manager
                .update_student(roll_number, patch)
                .map(Outcome::Student),
            Self::AddAdmin(input) => manager.add_admin(input).map(Outcome::Admin),
            Self::ViewReport(roll_number) => {
                manager.generate_report(roll_number).map(Outcome::Student)
            }
        }
    }
}

impl StudentOp {
    pub(crate) fn run<S: RecordStore, C: CredentialService>(
        self,
        manager: &RecordManager<S, C>,
    ) -> Result<Outcome, RecordError> {
        match self {
            Self::ViewReport(roll_number) => {
                manager.generate_report(roll_number).map(Outcome::Student)
            }
        }
    }

    #[must_use]
    pub(crate) const fn roll_number(&self) -> RollNumber {
        match self {
            Self::ViewReport(roll_number) => *roll_number,
        }
    }
}
