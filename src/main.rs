//! CLI entry point for the survey NPS tool.
//!
//! Provides subcommands for reporting on a CSV snapshot or URL, reporting on
//! a live Google Sheets worksheet, and inspecting how columns were discovered.

mod infra;

use crate::infra::keys::{EnvKeyStore, KeyStore};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::Path;
use survey_nps::{
    columns::DiscoveryConfig,
    error::IngestError,
    fetch::{BasicClient, fetch_bytes},
    output::{append_trend, print_comments, print_json, print_pretty},
    report::{Report, build_report},
    source::{SheetsAuth, SheetsClient, load_csv, parse_csv},
    table::{CleanTable, RawTable},
};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const ACCESS_TOKEN_VAR: &str = "SHEETS_ACCESS_TOKEN";
const API_KEY_VAR: &str = "SHEETS_API_KEY";

#[derive(Parser)]
#[command(name = "survey_nps")]
#[command(about = "Net Promoter Score reports from satisfaction survey responses", long_about = None)]
struct Cli {
    /// JSON file overriding the column discovery rules
    #[arg(long, global = true, value_name = "FILE")]
    columns: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(clap::Args)]
struct ReportArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    format: Format,

    /// CSV file to append the monthly trend to
    #[arg(long, value_name = "FILE")]
    trend_csv: Option<String>,

    /// Number of recent comments to show
    #[arg(long, default_value_t = 5)]
    comments: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Report on a CSV snapshot from a file or URL
    Report {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        #[command(flatten)]
        args: ReportArgs,
    },
    /// Report on a live Google Sheets worksheet
    Sheet {
        /// Spreadsheet id (the long token in the sheet URL)
        #[arg(value_name = "SPREADSHEET_ID")]
        spreadsheet_id: String,

        /// Worksheet name or A1 range
        #[arg(short, long, default_value = "Réponses")]
        range: String,

        /// Sheets API base URL
        #[arg(long, default_value = survey_nps::source::sheets::SHEETS_BASE_URL)]
        base_url: String,

        #[command(flatten)]
        args: ReportArgs,
    },
    /// Show table dimensions and how columns were discovered
    Columns {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/survey_nps.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("survey_nps.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = match &cli.columns {
        Some(path) => DiscoveryConfig::load(path)?,
        None => DiscoveryConfig::default(),
    };

    match cli.command {
        Commands::Report { source, args } => {
            let raw = load_source(&source).await?;
            render(build_report(&raw, &config, args.comments), &args)?;
        }
        Commands::Sheet {
            spreadsheet_id,
            range,
            base_url,
            args,
        } => {
            let auth = resolve_auth(&EnvKeyStore).await;
            let client = SheetsClient::new(auth.client()?).with_base_url(&base_url);
            let raw = client
                .fetch_table(&spreadsheet_id, &range)
                .await
                .inspect_err(|e| error!(error = %e, "Spreadsheet unavailable"))?;
            render(build_report(&raw, &config, args.comments), &args)?;
        }
        Commands::Columns { source } => {
            let raw = load_source(&source).await?;
            describe_columns(&raw, &config);
        }
    }

    Ok(())
}

/// Loads a table from a local file path or fetches CSV over HTTP.
#[tracing::instrument]
async fn load_source(source: &str) -> Result<RawTable, IngestError> {
    let table = if source.starts_with("http") {
        let client = BasicClient::new().map_err(IngestError::unavailable)?;
        parse_csv(&fetch_bytes(&client, source).await?)?
    } else {
        load_csv(Path::new(source))?
    };
    let (rows, cols) = table.dimensions();
    info!(rows, cols, "Source loaded");
    Ok(table)
}

/// Picks bearer token over API key; falls back to unauthenticated access.
async fn resolve_auth(store: &impl KeyStore) -> SheetsAuth {
    if let Some(token) = store.find(ACCESS_TOKEN_VAR).await {
        return SheetsAuth::Bearer(token);
    }
    if let Some(key) = store.find(API_KEY_VAR).await {
        return SheetsAuth::ApiKey(key);
    }
    warn!(
        "Neither {} nor {} is set, requesting without credentials",
        ACCESS_TOKEN_VAR, API_KEY_VAR
    );
    SheetsAuth::None
}

fn render(report: Report, args: &ReportArgs) -> Result<()> {
    for warning in &report.warnings {
        warn!(kind = ?warning.kind, "{warning}");
    }

    match args.format {
        Format::Pretty => {
            print_pretty(&report.summary);
            print_comments(&report.recent_comments);
        }
        Format::Json => print_json(&report)?,
    }

    if let Some(path) = &args.trend_csv {
        append_trend(path, &report.summary.monthly_trend)
            .with_context(|| format!("failed to write trend to '{path}'"))?;
        info!(path = %path, months = report.summary.monthly_trend.len(), "Trend appended");
    }

    Ok(())
}

fn describe_columns(raw: &RawTable, config: &DiscoveryConfig) {
    let (rows, cols) = raw.dimensions();
    info!(rows, cols, "Dimensions");

    let table = CleanTable::from_raw(raw);
    info!(headers = ?table.headers, "Columns");
    if !table.pruned.is_empty() {
        info!(pruned = ?table.pruned, "Empty columns dropped");
    }

    match config.discover(&table.headers) {
        Ok(map) => {
            for (field, header) in map.describe(&table.headers) {
                info!(field, header, "Discovered");
            }
        }
        Err(e) => warn!(error = %e, "Column discovery failed"),
    }
}
