//! # Sessions and Access Policy
//!
//! A [`Session`] is the proof of a successful login. It can only be built
//! inside this crate (by the auth gate), so holding one means the password
//! was verified. The [`AccessPolicy`] decides what a session may do.

use crate::{AdminId, RecordError, Role, RollNumber};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The authenticated identity behind a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Admin { id: AdminId, username: String },
    Student { roll_number: RollNumber, username: String },
}

impl Principal {
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Admin { .. } => Role::Admin,
            Self::Student { .. } => Role::Student,
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::Admin { username, .. } | Self::Student { username, .. } => username,
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    principal: Principal,
}

impl Session {
    pub(crate) fn new(principal: Principal) -> Self {
        Self { principal }
    }

    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.principal.role()
    }

    #[must_use]
    pub fn username(&self) -> &str {
        self.principal.username()
    }

    /// Roll number of a student session; `None` for admins.
    #[must_use]
    pub fn roll_number(&self) -> Option<RollNumber> {
        match &self.principal {
            Principal::Student { roll_number, .. } => Some(*roll_number),
            Principal::Admin { .. } => None,
        }
    }
}

// =============================================================================
// ACCESS POLICY
// =============================================================================

/// Which reports a student session may view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportScope {
    /// Only the student's own roll number.
    #[default]
    Own,
    /// Any roll number.
    Any,
}

impl ReportScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ReportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportScope {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "own" => Ok(Self::Own),
            "any" => Ok(Self::Any),
            other => Err(RecordError::invalid(format!(
                "unknown report scope '{other}' (expected 'own' or 'any')"
            ))),
        }
    }
}

/// Role policy consulted before every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicy {
    pub student_report_scope: ReportScope,
}

impl AccessPolicy {
    /// Whether `session` may view the report of `roll_number`.
    #[must_use]
    pub fn may_view_report(&self, session: &Session, roll_number: RollNumber) -> bool {
        match session.principal() {
            Principal::Admin { .. } => true,
            Principal::Student {
                roll_number: own, ..
            } => match self.student_report_scope {
                ReportScope::Own => *own == roll_number,
                ReportScope::Any => true,
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn student(roll: u32) -> Session {
        Session::new(Principal::Student {
            roll_number: RollNumber(roll),
            username: format!("s{roll}"),
        })
    }

    #[test]
    fn default_scope_is_own() {
        let policy = AccessPolicy::default();
        assert!(policy.may_view_report(&student(4), RollNumber(4)));
        assert!(!policy.may_view_report(&student(4), RollNumber(5)));
    }

    #[test]
    fn any_scope_allows_cross_access() {
        let policy = AccessPolicy {
            student_report_scope: ReportScope::Any,
        };
        assert!(policy.may_view_report(&student(4), RollNumber(5)));
    }

    #[test]
    fn admins_see_everything() {
        let admin = Session::new(Principal::Admin {
            id: AdminId(1),
            username: "root".to_string(),
        });
        assert!(AccessPolicy::default().may_view_report(&admin, RollNumber(99)));
        assert_eq!(admin.role(), Role::Admin);
        assert_eq!(admin.roll_number(), None);
    }

    #[test]
    fn scope_parses_case_insensitively() {
        assert_eq!("ANY".parse::<ReportScope>().expect("parse"), ReportScope::Any);
        assert!("everyone".parse::<ReportScope>().is_err());
    }
}
