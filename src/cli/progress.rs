//! CLI progress callback with a spinner per form

use crate::cli::style::{check, cross, spinner_style, Stylize};
use anstream::println;
use async_trait::async_trait;
use health_submit::progress::{ProgressCallback, Step};
use indicatif::ProgressBar;
use std::time::Duration;

/// Spinner showing the current step of one form
///
/// In verbose mode every settled step is also printed above the spinner.
pub struct CliProgress {
    label: String,
    verbose: bool,
    bar: ProgressBar,
}

impl CliProgress {
    /// Start a spinner for the form identified by `label`
    pub fn new(label: &str, verbose: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message(label.to_string());

        Self {
            label: label.to_string(),
            verbose,
            bar,
        }
    }

    /// Remove the spinner before the summary line is printed
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_step(&self, step: Step) {
        self.bar
            .set_message(format!("{} {}", self.label.accent(), step.muted()));
    }

    async fn on_step_done(&self, step: Step, success: bool, message: &str) {
        if !self.verbose {
            return;
        }

        let line = match (success, message.is_empty()) {
            (true, _) => format!("  {} {step}", check()),
            (false, true) => format!("  {} {step}", cross()),
            (false, false) => format!("  {} {step}: {}", cross(), message.muted()),
        };
        if self.bar.is_hidden() {
            println!("{line}");
        } else {
            self.bar.println(line);
        }
    }
}
