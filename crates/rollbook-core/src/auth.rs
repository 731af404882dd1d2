//! # Auth Gate
//!
//! Login and authorization.
//!
//! A login is a [`LoginAttempt`]: it is opened for a known username of a
//! given role and then accepts up to [`MAX_LOGIN_ATTEMPTS`] passwords. The
//! attempt is spent after the last failure and refuses everything from then
//! on, including the right password.
//!
//! Every operation goes through [`AuthGate::execute`], which checks the
//! session's role and the [`AccessPolicy`] before touching the manager.

use crate::command::{Operation, Outcome};
use crate::credentials::CredentialService;
use crate::manager::RecordManager;
use crate::primitives::MAX_LOGIN_ATTEMPTS;
use crate::session::{AccessPolicy, Principal, Session};
use crate::storage::RecordStore;
use crate::{AuthError, RecordError, Role};

/// An open login for one username.
#[derive(Debug)]
pub struct LoginAttempt {
    principal: Principal,
    password_hash: String,
    failures: u8,
}

impl LoginAttempt {
    /// Check one password.
    ///
    /// Returns the session on success, `IncorrectPassword` while attempts
    /// remain, and `AttemptsExhausted` on the last failure and on every call
    /// after it.
    pub fn submit<C: CredentialService>(
        &mut self,
        credentials: &C,
        password: &str,
    ) -> Result<Session, AuthError> {
        if self.is_exhausted() {
            return Err(AuthError::AttemptsExhausted);
        }

        if credentials.verify(password, &self.password_hash) {
            tracing::info!(
                event = "login_succeeded",
                role = %self.principal.role(),
                username = %self.principal.username(),
                "Login succeeded"
            );
            return Ok(Session::new(self.principal.clone()));
        }

        self.failures = self.failures.saturating_add(1);
        let attempts_left = self.attempts_left();
        tracing::warn!(
            event = "login_failed",
            role = %self.principal.role(),
            username = %self.principal.username(),
            attempts_left,
            "Incorrect password"
        );

        if attempts_left == 0 {
            tracing::warn!(
                event = "login_exhausted",
                role = %self.principal.role(),
                username = %self.principal.username(),
                "Login attempts exhausted"
            );
            return Err(AuthError::AttemptsExhausted);
        }
        Err(AuthError::IncorrectPassword { attempts_left })
    }

    /// Passwords that may still be submitted.
    #[must_use]
    pub fn attempts_left(&self) -> u8 {
        MAX_LOGIN_ATTEMPTS.saturating_sub(self.failures)
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.attempts_left() == 0
    }
}

/// Login and role enforcement.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthGate {
    policy: AccessPolicy,
}

impl AuthGate {
    #[must_use]
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Open a login for `username` under `role`.
    ///
    /// Fails with `UnknownUser` if no account of that role has the
    /// username, or if the student never signed up.
    pub fn begin<S: RecordStore>(
        &self,
        store: &S,
        role: Role,
        username: &str,
    ) -> Result<LoginAttempt, AuthError> {
        let found = match role {
            Role::Admin => store.fetch_admin(username)?.map(|admin| {
                (
                    Principal::Admin {
                        id: admin.id,
                        username: admin.username,
                    },
                    Some(admin.password_hash),
                )
            }),
            Role::Student => store.fetch_student_by_username(username)?.map(|record| {
                (
                    Principal::Student {
                        roll_number: record.roll_number(),
                        username: username.to_string(),
                    },
                    record.password_hash().map(str::to_string),
                )
            }),
        };

        match found {
            Some((principal, Some(password_hash))) => Ok(LoginAttempt {
                principal,
                password_hash,
                failures: 0,
            }),
            _ => {
                tracing::warn!(
                    event = "login_unknown_user",
                    role = %role,
                    username = %username,
                    "Login for unknown user"
                );
                Err(AuthError::UnknownUser {
                    role,
                    username: username.to_string(),
                })
            }
        }
    }

    /// Run a whole login with a sequence of passwords.
    ///
    /// Stops at the first success or at exhaustion. If the passwords run
    /// out first, the last `IncorrectPassword` is returned.
    pub fn authenticate<S, C, I>(
        &self,
        manager: &RecordManager<S, C>,
        role: Role,
        username: &str,
        passwords: I,
    ) -> Result<Session, AuthError>
    where
        S: RecordStore,
        C: CredentialService,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut attempt = self.begin(manager.store(), role, username)?;
        let mut last = AuthError::IncorrectPassword {
            attempts_left: attempt.attempts_left(),
        };
        for password in passwords {
            match attempt.submit(manager.credentials(), password.as_ref()) {
                Ok(session) => return Ok(session),
                Err(AuthError::AttemptsExhausted) => return Err(AuthError::AttemptsExhausted),
                Err(e) => last = e,
            }
        }
        Err(last)
    }

    /// Check that `session` may run `operation`.
    pub fn authorize(&self, session: &Session, operation: &Operation) -> Result<(), RecordError> {
        let allowed = match operation {
            Operation::Admin(_) => session.role() == Role::Admin,
            Operation::Student(op) => {
                session.role() == Role::Student
                    && self.policy.may_view_report(session, op.roll_number())
            }
        };

        if allowed {
            Ok(())
        } else {
            tracing::warn!(
                event = "forbidden_operation",
                role = %session.role(),
                username = %session.username(),
                operation = operation.name(),
                "Operation refused"
            );
            Err(RecordError::Forbidden {
                role: session.role(),
                operation: operation.name(),
            })
        }
    }

    /// Authorize and run an operation.
    pub fn execute<S: RecordStore, C: CredentialService>(
        &self,
        manager: &mut RecordManager<S, C>,
        session: &Session,
        operation: Operation,
    ) -> Result<Outcome, RecordError> {
        self.authorize(session, &operation)?;
        match operation {
            Operation::Admin(op) => op.run(manager),
            Operation::Student(op) => op.run(manager),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
