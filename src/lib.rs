//! health-submit - daily health check-in automation
//!
//! Binds an identity to a remote session, submits the daily health form and
//! unbinds again. The library exposes each piece separately so callers can
//! drive a single [`submitter::Submitter`] or a whole batch from config.

pub mod codec;
pub mod config;
pub mod error;
pub mod form;
pub mod progress;
pub mod select;
pub mod status;
pub mod submitter;
pub mod types;
