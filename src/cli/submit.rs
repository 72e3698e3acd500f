//! Submit command - check in every configured form

use crate::cli::progress::CliProgress;
use crate::cli::style::{check, cross, Stylize};
use anstream::{eprintln, println};
use health_submit::config::Config;
use health_submit::error::Result;
use health_submit::form::Form;
use health_submit::select::TEMPERATURES;
use health_submit::submitter::Submitter;
use tracing::{info, warn};

/// Options of the submit command
#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    /// Only submit the form with this serial number
    pub only: Option<String>,
    /// Print what would be sent without contacting the service
    pub dry_run: bool,
    /// Print the full status of each form as JSON
    pub json: bool,
    /// Print each settled step
    pub verbose: bool,
}

/// Run the submit command
///
/// Forms are processed one at a time, each with its own session. An error on
/// one form is reported and the remaining forms still run. Returns whether
/// every form was submitted successfully.
pub async fn run_submit(config: &Config, options: &SubmitOptions) -> Result<bool> {
    let forms = config.forms(options.only.as_deref())?;

    if options.dry_run {
        report_dry_run(config, &forms)?;
        return Ok(true);
    }

    let submitter_config = config.submitter_config();
    let mut failed = 0usize;

    for form in &forms {
        let label = format!("{} ({})", form.sn(), form.nickname());
        let submitter = Submitter::new(form, &submitter_config)?;

        let progress = CliProgress::new(&label, options.verbose);
        let result = submitter.submit(&progress).await;
        progress.finish();
        let status = match result {
            Ok(status) => status,
            Err(e) => {
                warn!(sn = form.sn(), "form aborted: {e}");
                failed += 1;
                println!("{} {} {e}", cross(), form.sn().accent());
                continue;
            }
        };

        info!(sn = form.sn(), recap = %status.recap(), "form processed");

        if status.is_ok() {
            println!("{} {} {}", check(), form.sn().accent(), status.recap().success());
        } else {
            failed += 1;
            println!("{} {} {}", cross(), form.sn().accent(), status.recap());
        }

        if options.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    if failed > 0 {
        eprintln!(
            "{}",
            format!("{failed} of {} form(s) not submitted", forms.len()).error()
        );
    }

    Ok(failed == 0)
}

/// Show what each form would send
fn report_dry_run(config: &Config, forms: &[Form]) -> Result<()> {
    println!("{}", "Dry run - no requests will be sent".emphasis());
    println!("Service: {}", config.base_url.accent());

    let temperature = config.temperature;
    for form in forms {
        println!();
        println!("{} ({})", form.sn().accent(), form.nickname());
        println!("  {}", form.address().muted());
        let report = form.health_report(temperature.pick(TEMPERATURES));
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
