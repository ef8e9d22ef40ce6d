//! sdq-audit - season data quality audit tool
//!
//! Subcommands:
//! - `validate`: audit one season and print the report
//! - `update`: run the external database updater per predictor, then
//!   optionally audit
//! - `models`: list the latest trained artifact per model

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sdq_audit::workflow::{latest_artifacts, update_season, CommandUpdater};
use sdq_audit::{audit_database, run_audit, ReportFormat, SeasonReport};
use sdq_common::config::{ConfigSource, TomlConfig};
use sdq_common::SeasonKey;
use tracing::{error, info, warn};

/// Command-line arguments for sdq-audit
#[derive(Parser, Debug)]
#[command(name = "sdq-audit")]
#[command(about = "Season data quality audit for the events store")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite store, overrides `database_path` from the configuration
    #[arg(short, long, global = true, env = "SDQ_DATABASE")]
    database: Option<PathBuf>,

    /// Log level, overrides `[logging] level`
    #[arg(long, global = true, env = "SDQ_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit one season
    Validate {
        /// Season key, e.g. 2024-2025
        #[arg(short, long)]
        season: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Update a season with every expected predictor
    Update {
        /// Season key, e.g. 2024-2025
        #[arg(short, long)]
        season: String,

        /// Audit the season once the updates finished
        #[arg(long)]
        audit: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the latest artifact of every configured model
    Models,
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Configuration is read before tracing exists; its source is logged below
    let (config, source) = TomlConfig::load_resolved(args.config.as_deref())
        .context("Failed to load configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting sdq-audit v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("SDQ_GIT_REV"),
        env!("SDQ_BUILD_TIMESTAMP"),
        env!("SDQ_BUILD_PROFILE")
    );
    match &source {
        ConfigSource::Explicit(path) | ConfigSource::Discovered(path) => {
            info!("Configuration: {}", path.display())
        }
        ConfigSource::Defaults => warn!("No configuration file found, using built-in defaults"),
    }

    let db_path = args
        .database
        .clone()
        .unwrap_or_else(|| config.database_path.clone());

    let result = match args.command {
        Command::Validate { season, output } => validate(&config, &season, &db_path, &output).await,
        Command::Update {
            season,
            audit,
            output,
        } => update(&config, &season, &db_path, audit, &output).await,
        Command::Models => models(&config),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("{:#}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn validate(config: &TomlConfig, season: &str, db_path: &Path, output: &OutputArgs) -> Result<()> {
    let report = run_audit(config, season, db_path)
        .await
        .with_context(|| format!("Audit of season {} failed", season))?;
    emit(&report, output)
}

async fn update(
    config: &TomlConfig,
    season: &str,
    db_path: &Path,
    audit: bool,
    output: &OutputArgs,
) -> Result<()> {
    let season_key = SeasonKey::parse(season)?;
    config.check_season_listed(&season_key)?;

    let updater = CommandUpdater::from_config(&config.update)?;
    let summary = update_season(&updater, &season_key, &config.expected_predictors).await;

    info!(
        "Updated {} of {} predictors",
        summary.succeeded.len(),
        summary.succeeded.len() + summary.failed.len()
    );
    for failure in &summary.failed {
        warn!("Skipped {}: {}", failure.item, failure.error);
    }

    if audit {
        let report = audit_database(config, &season_key, db_path)
            .await
            .with_context(|| format!("Audit of season {} failed", season_key))?;
        emit(&report, output)?;
    }
    Ok(())
}

fn models(config: &TomlConfig) -> Result<()> {
    let statuses = latest_artifacts(&config.models).context("Failed to scan model artifacts")?;
    for status in statuses {
        match status.latest {
            Some(path) => println!("{}: {}", status.model, path.display()),
            None => println!("{}: (none)", status.model),
        }
    }
    Ok(())
}

fn emit(report: &SeasonReport, output: &OutputArgs) -> Result<()> {
    let rendered = report.render(output.format)?;
    match &output.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
