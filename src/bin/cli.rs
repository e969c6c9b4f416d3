//! termo-watch CLI
//!
//! Polls the district heating status page and publishes outage entities.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use termo_watch::{
    error::Result,
    models::{Config, ReportPeriod},
    pipeline::{self, ExportDocument, ExportFormat, Monitor, diagnostics, export},
    publish,
};

/// termo-watch - District Heating Outage Monitor
#[derive(Parser, Debug)]
#[command(
    name = "termo-watch",
    version,
    about = "Publishes district heating outages for a street to Home Assistant"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll and publish until interrupted (SIGHUP forces a refresh)
    Run,

    /// Poll once and publish
    Once {
        /// Print entities instead of publishing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Poll once and fire the report event
    Report {
        /// Reporting window: 1day, 7days or 30days
        #[arg(long, default_value = "7days")]
        period: String,
    },

    /// Poll once and export the snapshot
    Export {
        /// Output encoding: json or toml
        #[arg(long, default_value = "json")]
        format: ExportFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Poll once and print redacted diagnostics as JSON
    Diagnostics,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Validate the configuration and build a monitor for it.
///
/// Publisher settings are only checked when the command publishes.
fn build_monitor(config: &Arc<Config>, publishes: bool) -> Result<Monitor> {
    if publishes {
        config.validate()?;
    } else {
        config.validate_source()?;
    }
    Monitor::new(Arc::clone(config))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(&cli.config)?;
    log::info!("Loaded configuration from {}", cli.config.display());

    let config = Arc::new(config);

    match cli.command {
        Command::Validate => pipeline::run_validate(&config)?,

        Command::Run => {
            let monitor = build_monitor(&config, true)?;
            let publisher = publish::from_config(&config)?;
            pipeline::run_monitor(monitor, publisher.as_ref()).await?;
        }

        Command::Once { dry_run } => {
            let mut monitor = build_monitor(&config, !dry_run)?;
            if dry_run {
                monitor.poll().await;
                let entities = monitor.entities();
                println!("{}", serde_json::to_string_pretty(&entities)?);
            } else {
                let publisher = publish::from_config(&config)?;
                let outcome = pipeline::run_cycle(&mut monitor, publisher.as_ref()).await;
                log::info!("Poll outcome: {:?}", outcome);
            }
        }

        Command::Report { period } => {
            let mut monitor = build_monitor(&config, true)?;
            let period = ReportPeriod::parse_lenient(&period);
            let publisher = publish::from_config(&config)?;
            let report = pipeline::run_report(&mut monitor, publisher.as_ref(), period).await?;
            log::info!(
                "Report: {} interruption(s) over {} day(s)",
                report.summary.total_interruptions,
                report.window_days
            );
        }

        Command::Export { format, output } => {
            log::info!("Exporting data as {}", format);
            let mut monitor = build_monitor(&config, false)?;
            monitor.poll().await;
            let document = ExportDocument {
                street: &config.location.street,
                exported_at: Utc::now(),
                available: monitor.is_available(),
                total_found: monitor.snapshot().map_or(0, |s| s.total_found()),
                snapshot: monitor.snapshot(),
            };
            let rendered = export::render(&document, format)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    log::info!("Export saved to {}", path.display());
                }
                None => println!("{rendered}"),
            }
        }

        Command::Diagnostics => {
            let mut monitor = build_monitor(&config, false)?;
            monitor.poll().await;
            let diagnostics = diagnostics::collect(&monitor);
            println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        }
    }

    log::info!("Done!");

    Ok(())
}
