//! Progress callback trait for interface-agnostic updates
//!
//! The submitter reports each remote step through this trait so the CLI can
//! render a spinner while library users can stay silent.

use async_trait::async_trait;
use std::fmt;

/// Remote step of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Establishing the session
    CheckBind,
    /// Binding the identity to the session
    BindUserInfo,
    /// Sending the daily report
    SubmitForm,
    /// Releasing the binding
    CancelBind,
}

impl Step {
    /// Endpoint path, relative to the service base URL
    pub const fn path(self) -> &'static str {
        match self {
            Self::CheckBind => "/api/login/checkBind",
            Self::BindUserInfo => "/api/login/bindUserInfo",
            Self::SubmitForm => "/monitorRegister",
            Self::CancelBind => "/api/login/cancelBind",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckBind => write!(f, "Checking session"),
            Self::BindUserInfo => write!(f, "Binding identity"),
            Self::SubmitForm => write!(f, "Submitting report"),
            Self::CancelBind => write!(f, "Unbinding identity"),
        }
    }
}

/// Progress callback trait
///
/// Implement this trait to receive updates while a form is submitted.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called before a step's request is sent
    async fn on_step(&self, step: Step);

    /// Called once the service answered a step
    ///
    /// `message` is the rejection reason on failure and may be empty.
    async fn on_step_done(&self, step: Step, success: bool, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_step(&self, _step: Step) {}
    async fn on_step_done(&self, _step: Step, _success: bool, _message: &str) {}
}
