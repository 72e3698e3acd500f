//! CLI commands
//!
//! Command implementations for the `health-submit` binary.

mod init;
mod progress;
mod style;
mod submit;

pub use init::run_init;
pub use submit::{run_submit, SubmitOptions};
