//! CLI entry point for startrack.
//!
//! Loads the GitHub star and PyPI download snapshot tables and prints stats,
//! growth buckets, totals, the top grower, or the plain-text digest.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use startrack::{
    output::{format_change, format_compact, print_json, render_table, write_stats_csv},
    parser::load_table,
    selection::Selection,
    stats::{Dashboard, ReportPeriod},
    table::{DatasetKind, Table},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "startrack")]
#[command(about = "Star and download trends for tracked repositories and packages", long_about = None)]
struct Cli {
    /// Star snapshot CSV [env: STARTRACK_STARS_CSV, default: data/github_data.csv]
    #[arg(long, global = true, value_name = "PATH")]
    stars: Option<String>,

    /// Download snapshot CSV [env: STARTRACK_DOWNLOADS_CSV, default: data/pypi_data.csv]
    #[arg(long, global = true, value_name = "PATH")]
    downloads: Option<String>,

    /// JSON file listing the active columns [env: STARTRACK_SELECTION]
    #[arg(long, global = true, value_name = "PATH")]
    selection: Option<String>,

    /// Date to treat as today (YYYY-MM-DD), defaults to the current UTC date
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-entity current value, change and streak
    Stats {
        #[arg(short, long, value_enum, default_value_t = Dataset::Stars)]
        dataset: Dataset,

        /// Look-back window in days
        #[arg(short, long, default_value_t = 30)]
        window: u32,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Also write the records to this CSV file
        #[arg(long)]
        csv: Option<String>,
    },
    /// Incremental growth per day/week/month bucket, as JSON
    Growth {
        #[arg(short, long, value_enum, default_value_t = Dataset::Stars)]
        dataset: Dataset,

        /// Look-back window in days (0 = all history)
        #[arg(short, long, default_value_t = 30)]
        window: u32,

        /// Columns to chart (defaults to the active selection)
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Sum of the latest values of the active columns
    Total {
        #[arg(short, long, value_enum, default_value_t = Dataset::Stars)]
        dataset: Dataset,
    },
    /// Repository with the largest absolute star change
    Top {
        #[arg(short, long, default_value_t = 7)]
        window: u32,
    },
    /// Plain-text digest of both datasets
    Report {
        #[arg(short, long, value_enum, default_value_t = Period::Weekly)]
        period: Period,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Dataset {
    Stars,
    Downloads,
}

impl From<Dataset> for DatasetKind {
    fn from(dataset: Dataset) -> Self {
        match dataset {
            Dataset::Stars => DatasetKind::Stars,
            Dataset::Downloads => DatasetKind::Downloads,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Period {
    Weekly,
    Monthly,
}

impl From<Period> for ReportPeriod {
    fn from(period: Period) -> Self {
        match period {
            Period::Weekly => ReportPeriod::Weekly,
            Period::Monthly => ReportPeriod::Monthly,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/startrack.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("startrack.log"));

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

    let stars_path = cli
        .stars
        .unwrap_or_else(|| env_or("STARTRACK_STARS_CSV", "data/github_data.csv"));
    let downloads_path = cli
        .downloads
        .unwrap_or_else(|| env_or("STARTRACK_DOWNLOADS_CSV", "data/pypi_data.csv"));

    let selection = match cli
        .selection
        .or_else(|| std::env::var("STARTRACK_SELECTION").ok())
    {
        Some(path) => Selection::load(&path)?,
        None => Selection::all(),
    };

    let (stars, downloads) = tokio::try_join!(load(stars_path), load(downloads_path))?;

    let mut dashboard = Dashboard::new(stars, downloads);
    if let Some(today) = cli.today {
        dashboard = dashboard.with_today(today);
    }
    info!(today = %dashboard.today(), "Dashboard ready");

    match cli.command {
        Commands::Stats {
            dataset,
            window,
            format,
            csv,
        } => {
            let kind = DatasetKind::from(dataset);
            let records = dashboard.stats(kind, &selection, window);

            if let Some(path) = csv {
                write_stats_csv(&path, &records)?;
                info!(path = %path, records = records.len(), "Stats written");
            }

            match format {
                Format::Text => print!("{}", render_table(kind, &records)),
                Format::Json => print_json(&records)?,
            }
        }
        Commands::Growth {
            dataset,
            window,
            columns,
        } => {
            let kind = DatasetKind::from(dataset);
            let columns = if columns.is_empty() {
                dashboard.active_columns(kind, &selection)
            } else {
                columns
            };
            let buckets = dashboard.growth_buckets(kind, &columns, window);
            print_json(&buckets)?;
        }
        Commands::Total { dataset } => {
            let kind = DatasetKind::from(dataset);
            let total = dashboard.total(kind, &selection);
            println!("{} {}", format_compact(total), kind.unit());
        }
        Commands::Top { window } => match dashboard.top_grower(&selection, window) {
            Some(top) => println!(
                "{} {}",
                top.name,
                format_change(top.change_abs, top.change_percent)
            ),
            None => warn!("No active repositories"),
        },
        Commands::Report { period } => {
            print!("{}", dashboard.report(&selection, period.into()));
        }
    }

    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Loads a snapshot table off the async runtime. A missing file yields an
/// empty table so the other dataset can still be reported.
#[tracing::instrument]
async fn load(path: String) -> Result<Table> {
    if !Path::new(&path).exists() {
        warn!("Snapshot file not found, continuing with an empty table");
        return Ok(Table::default());
    }
    tokio::task::spawn_blocking(move || load_table(&path)).await?
}
