//! scdash - Search Console analytics dashboard

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use scdash_core::{
    export, export_to_path, summary_report, DashboardConfig, ExportFormat, ExportPayload,
    MetricsTable,
};
use scdash_web::AppState;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "scdash",
    version,
    about = "Search Console analytics dashboard",
    long_about = "Loads a Search Console performance export (CSV) into memory and serves\n\
                  interactive dashboard views as a JSON API, or prints summaries and exports.\n\
                  \n\
                  Expected columns: date,type,page,clicks,impressions,ctr,position\n\
                  \n\
                  Examples:\n\
                    scdash --data gsc.csv                     # Serve the API (default)\n\
                    scdash --data gsc.csv web --port 9000     # Custom port\n\
                    scdash --data gsc.csv summary --json      # Print a summary as JSON\n\
                    scdash --data gsc.csv export -f md -o report.md --summary\n\
                  \n\
                  Environment Variables:\n\
                    SCDASH_DATA                               # Path to the CSV file\n\
                    SCDASH_CONFIG                             # Path to the config file\n\
                    SCDASH_NO_COLOR                           # Disable ANSI colors\n\
                    RUST_LOG                                  # Log filter (overrides config)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Path to the metrics CSV (default: data_path from the config file)
    #[arg(long, short = 'd', env = "SCDASH_DATA", global = true)]
    data: Option<PathBuf>,

    /// Path to the config file (default: ~/.config/scdash/config.toml)
    #[arg(long, env = "SCDASH_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "SCDASH_NO_COLOR", global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Serve the dashboard JSON API (default)
    Web {
        /// Bind address (default from config)
        #[arg(long)]
        host: Option<String>,
        /// Port for web server (default from config)
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
    /// Print aggregate totals and per-type breakdown, then exit
    Summary {
        /// First day, YYYY-MM-DD (default: first day in the data)
        #[arg(long)]
        start: Option<String>,
        /// Last day, YYYY-MM-DD (default: last day in the data)
        #[arg(long)]
        end: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the filtered rows or a summary report
    Export {
        /// csv, json, markdown or xlsx
        #[arg(long, short = 'f', default_value = "csv")]
        format: String,
        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// Export the summary report instead of raw rows
        #[arg(long)]
        summary: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::load(path),
        None => DashboardConfig::load_default(),
    }
    .context("Failed to load configuration")?;

    init_logging(&config.log_level, cli.no_color);

    let data_path = cli
        .data
        .clone()
        .or_else(|| config.data_path.clone())
        .context("No data file given: pass --data, set SCDASH_DATA, or set data_path in the config file")?;

    let mode = cli.mode.unwrap_or(Mode::Web {
        host: None,
        port: None,
    });

    match mode {
        Mode::Web { host, port } => {
            let host = host.unwrap_or_else(|| config.host.clone());
            let port = port.unwrap_or(config.port);
            run_web(&data_path, config, &host, port).await?;
        }
        Mode::Summary { start, end, json } => {
            run_summary(&data_path, start, end, json, cli.no_color)?;
        }
        Mode::Export {
            format,
            output,
            start,
            end,
            summary,
        } => {
            run_export(&data_path, &format, output, start, end, summary)?;
        }
    }

    Ok(())
}

/// RUST_LOG wins over the configured level; logs go to stderr so stdout stays pipeable
fn init_logging(level: &str, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .try_init();
}

/// Load the CSV behind a spinner, printing the fix-it hint on failure
fn load_table(path: &Path, show_progress: bool) -> Result<MetricsTable> {
    let start = Instant::now();

    let spinner = if show_progress {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Loading {}...", path.display()));

    match scdash_core::load(path) {
        Ok(table) => {
            let elapsed = start.elapsed();
            spinner.finish_with_message(format!(
                "✓ Ready in {:.2}s ({} rows, {} content types)",
                elapsed.as_secs_f64(),
                table.len(),
                table.types().len()
            ));
            Ok(table)
        }
        Err(e) => {
            spinner.finish_and_clear();
            if let Some(hint) = e.suggestion() {
                eprintln!("Hint: {}", hint);
            }
            Err(e).with_context(|| format!("Failed to load {}", path.display()))
        }
    }
}

async fn run_web(data_path: &Path, config: DashboardConfig, host: &str, port: u16) -> Result<()> {
    let table = load_table(data_path, true)?;
    if table.is_empty() {
        info!(path = %data_path.display(), "Data file has no rows, every view will be empty");
    }

    println!("\nAPI endpoints: http://{}:{}/api/*", host, port);
    let state = Arc::new(AppState::new(Arc::new(table), config));
    scdash_web::run(state, host, port).await
}

fn run_summary(
    data_path: &Path,
    start: Option<String>,
    end: Option<String>,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let table = load_table(data_path, !json)?;
    let range = cli::resolve_range(&table, start.as_deref(), end.as_deref())?;
    debug!(?range, "Summary range");

    let report = summary_report(&table, range);
    println!("{}", cli::format_summary(&report, json, no_color)?);
    Ok(())
}

fn run_export(
    data_path: &Path,
    format: &str,
    output: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
    summary: bool,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let table = load_table(data_path, output.is_some())?;
    let range = cli::resolve_range(&table, start.as_deref(), end.as_deref())?;

    let payload = if summary {
        ExportPayload::Summary(summary_report(&table, range))
    } else {
        ExportPayload::Table(match &range {
            Some(r) => table.slice(r),
            None => table.all(),
        })
    };

    match output {
        Some(path) => {
            export_to_path(format, &payload, &path)?;
            info!(path = %path.display(), format = %format, "Export written");
            println!("Exported {} to {}", format, path.display());
        }
        None => {
            let bytes = export(format, &payload)?;
            std::io::stdout()
                .write_all(&bytes)
                .context("Failed to write export to stdout")?;
        }
    }

    Ok(())
}
