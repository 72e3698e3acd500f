//! Submission status as a step-indexed state machine
//!
//! A [`SubmitStatus`] only moves forward: check, bind, submit (only after a
//! successful bind), cancel. Queries are computed over whichever stage the
//! run reached; steps that were never reached read as failure or `""`.

use crate::error::{Error, Result};
use crate::types::{CheckBindData, Outcome, UserRecord};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Stage reached by a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing sent yet
    NotStarted,
    /// Session established
    Checked,
    /// Bind attempted
    Bound,
    /// Form submitted
    Submitted,
    /// Unbind attempted
    Cancelled,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Checked => write!(f, "checked"),
            Self::Bound => write!(f, "bound"),
            Self::Submitted => write!(f, "submitted"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Accumulated result of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum SubmitStatus {
    /// Nothing sent yet
    #[default]
    NotStarted,
    /// `checkBind` answered
    Checked {
        /// Session handed out by the service
        check: CheckBindData,
    },
    /// `bindUserInfo` answered
    Bound {
        /// Session handed out by the service
        check: CheckBindData,
        /// Bound profile, or why binding was refused
        bind: Outcome<UserRecord>,
    },
    /// `monitorRegister` answered; only reachable from a successful bind
    Submitted {
        /// Session handed out by the service
        check: CheckBindData,
        /// Bound profile
        user: UserRecord,
        /// Whether the report was accepted
        submit: Outcome<Value>,
    },
    /// `cancelBind` answered
    Cancelled {
        /// Status right before unbinding
        before: Box<Self>,
        /// Unbind message, or why unbinding failed
        cancel: Outcome<Option<String>>,
    },
}

impl SubmitStatus {
    /// Stage this status is in
    pub const fn stage(&self) -> Stage {
        match self {
            Self::NotStarted => Stage::NotStarted,
            Self::Checked { .. } => Stage::Checked,
            Self::Bound { .. } => Stage::Bound,
            Self::Submitted { .. } => Stage::Submitted,
            Self::Cancelled { .. } => Stage::Cancelled,
        }
    }

    /// Record the `checkBind` result
    pub fn with_check(self, check: CheckBindData) -> Result<Self> {
        match self {
            Self::NotStarted => Ok(Self::Checked { check }),
            other => Err(other.invalid(Stage::Checked)),
        }
    }

    /// Record the `bindUserInfo` result
    pub fn with_bind(self, bind: Outcome<UserRecord>) -> Result<Self> {
        match self {
            Self::Checked { check } => Ok(Self::Bound { check, bind }),
            other => Err(other.invalid(Stage::Bound)),
        }
    }

    /// Record the `monitorRegister` result; requires a successful bind
    pub fn with_submit(self, submit: Outcome<Value>) -> Result<Self> {
        match self {
            Self::Bound {
                check,
                bind: Outcome::Success(user),
            } => Ok(Self::Submitted {
                check,
                user,
                submit,
            }),
            other => Err(other.invalid(Stage::Submitted)),
        }
    }

    /// Record the `cancelBind` result
    pub fn with_cancel(self, cancel: Outcome<Option<String>>) -> Result<Self> {
        match self {
            Self::NotStarted | Self::Cancelled { .. } => Err(self.invalid(Stage::Cancelled)),
            before => Ok(Self::Cancelled {
                before: Box::new(before),
                cancel,
            }),
        }
    }

    fn invalid(&self, to: Stage) -> Error {
        Error::InvalidTransition {
            from: self.stage(),
            to,
        }
    }

    /// The status as it stood before unbinding
    fn settled(&self) -> &Self {
        match self {
            Self::Cancelled { before, .. } => before,
            other => other,
        }
    }

    /// Session data from `checkBind`, if reached
    pub fn check(&self) -> Option<&CheckBindData> {
        match self.settled() {
            Self::Checked { check } | Self::Bound { check, .. } | Self::Submitted { check, .. } => {
                Some(check)
            }
            Self::NotStarted | Self::Cancelled { .. } => None,
        }
    }

    /// Session identifier, `""` if `checkBind` was not reached
    pub fn session_id(&self) -> &str {
        self.check().map_or("", |c| c.session_id.as_str())
    }

    /// Profile bound to the session, if binding succeeded
    pub fn bound_user(&self) -> Option<&UserRecord> {
        match self.settled() {
            Self::Bound {
                bind: Outcome::Success(user),
                ..
            }
            | Self::Submitted { user, .. } => Some(user),
            _ => None,
        }
    }

    /// Whether binding succeeded
    pub fn is_bind_success(&self) -> bool {
        self.bound_user().is_some()
    }

    /// Reason binding was refused, `""` otherwise
    pub fn bind_message(&self) -> &str {
        match self.settled() {
            Self::Bound { bind, .. } => bind.message(),
            _ => "",
        }
    }

    /// `college-className-name` of the bound user, `""` if binding failed
    pub fn bind_user_digest(&self) -> String {
        self.bound_user().map(UserRecord::digest).unwrap_or_default()
    }

    /// Result of `monitorRegister`, if it was sent
    pub fn submit_result(&self) -> Option<&Outcome<Value>> {
        match self.settled() {
            Self::Submitted { submit, .. } => Some(submit),
            _ => None,
        }
    }

    /// Whether the report was accepted
    pub fn is_submit_success(&self) -> bool {
        self.submit_result().is_some_and(Outcome::is_success)
    }

    /// Reason the report was rejected, `""` otherwise
    pub fn submit_message(&self) -> &str {
        self.submit_result().map_or("", Outcome::message)
    }

    /// Result of `cancelBind`, if it was sent
    pub const fn cancel_result(&self) -> Option<&Outcome<Option<String>>> {
        match self {
            Self::Cancelled { cancel, .. } => Some(cancel),
            _ => None,
        }
    }

    /// Whether unbinding succeeded
    pub fn is_cancel_success(&self) -> bool {
        self.cancel_result().is_some_and(Outcome::is_success)
    }

    /// Overall success: bound and report accepted
    pub fn is_ok(&self) -> bool {
        self.is_bind_success() && self.is_submit_success()
    }

    /// One-line summary of the run
    pub fn recap(&self) -> String {
        if !self.is_bind_success() {
            return format!("bind failed: {}", self.bind_message());
        }

        if self.is_submit_success() {
            format!("bind succeeded: {}", self.bind_user_digest())
        } else {
            format!("{}: {}", self.submit_message(), self.bind_user_digest())
        }
    }
}
