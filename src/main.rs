//! health-submit - daily health check-in automation
//!
//! CLI binary that binds, submits and unbinds every configured form.

use anyhow::Result;
use clap::{Parser, Subcommand};
use health_submit::config::{config_path, Config};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

mod cli;

#[derive(Parser)]
#[command(name = "health-submit")]
#[command(about = "Daily health check-in: bind, submit, unbind")]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs and every step as it settles
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Append a full debug log (raw responses included) to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit every configured form (default)
    Submit {
        /// Only submit the form with this serial number
        #[arg(long)]
        only: Option<String>,

        /// Dry run - show what would be sent without contacting the service
        #[arg(long)]
        dry_run: bool,

        /// Print the full status of each form as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a config template
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Install the process-wide subscriber
///
/// Console output goes to stderr so stdout carries only results. The log file,
/// when given, always records at debug level.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "health_submit=debug" } else { "warn" }));
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let file = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(EnvFilter::new("health_submit=debug")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry().with(console).with(file).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let path = config_path(cli.config.as_deref())?;

    let command = cli.command.unwrap_or(Commands::Submit {
        only: None,
        dry_run: false,
        json: false,
    });

    match command {
        Commands::Init { force } => {
            init_logging(cli.verbose, None)?;
            cli::run_init(&path, force)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Submit {
            only,
            dry_run,
            json,
        } => {
            let config = Config::load(&path)?;
            let log_file = cli.log_file.as_deref().or(config.log_file.as_deref());
            init_logging(cli.verbose, log_file)?;
            info!("health-submit v{} starting", env!("CARGO_PKG_VERSION"));

            let options = cli::SubmitOptions {
                only,
                dry_run,
                json,
                verbose: cli.verbose,
            };
            let all_ok = cli::run_submit(&config, &options).await?;

            Ok(if all_ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
