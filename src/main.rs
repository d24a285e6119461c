//! CLI entry point for the delay rater.
//!
//! Loads transit delay logs from catalog names, URLs or local files, merges
//! them, and reports average delay and non-zero delay frequency for every
//! (day, hour) as console summaries and dense CSV tables.

mod services;

use crate::services::source_catalog::SourceCatalog;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use delay_rater::analyzers::aggregate::breakdown;
use delay_rater::analyzers::analyzer::analyze;
use delay_rater::analyzers::bucket::bucketize;
use delay_rater::analyzers::types::HourRange;
use delay_rater::{
    fetch::{BasicClient, fetch_bytes},
    output::{
        DenseTable, print_json, print_pretty, report_paths, write_average_summary,
        write_breakdown, write_frequency_summary, write_table,
    },
    parser::{RowPolicy, parse_records},
    record::RecordSet,
};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use tracing::Instrument;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "delay_rater")]
#[command(about = "Hourly delay statistics for transit delay logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute average delay and non-zero delay frequency per day and hour
    Analyze {
        /// Catalog names, URLs or file paths, merged in the order given
        #[arg(value_name = "SOURCE", required = true)]
        sources: Vec<String>,

        /// Transit mode, used to name the output tables
        #[arg(short, long, value_enum, default_value_t = Mode::Subway)]
        mode: Mode,

        /// Directory to write the CSV tables to
        #[arg(short, long, default_value = "output")]
        output_dir: String,

        /// Drop records whose hour falls in this inclusive range (e.g. "3-5")
        #[arg(short = 'x', long)]
        exclude_hours: Option<HourRange>,

        /// Skip malformed rows instead of failing the source
        #[arg(long, default_value_t = false)]
        skip_malformed: bool,

        /// Also log the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print record counts per day, hour and delay category
    Breakdown {
        /// Catalog names, URLs or file paths, merged in the order given
        #[arg(value_name = "SOURCE", required = true)]
        sources: Vec<String>,

        /// Drop records whose hour falls in this inclusive range (e.g. "3-5")
        #[arg(short = 'x', long)]
        exclude_hours: Option<HourRange>,

        /// Skip malformed rows instead of failing the source
        #[arg(long, default_value_t = false)]
        skip_malformed: bool,
    },
    /// List the named sources known to the catalog
    ListSources,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Subway,
    Bus,
}

impl Mode {
    fn prefix(self) -> &'static str {
        match self {
            Mode::Subway => "subway",
            Mode::Bus => "bus",
        }
    }
}

fn row_policy(skip_malformed: bool) -> RowPolicy {
    if skip_malformed {
        RowPolicy::Skip
    } else {
        RowPolicy::Reject
    }
}

/// Filter read from `var`, falling back to `default` when the variable is
/// unset or holds no directives.
fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(var)
        .from_env_lossy()
}

/// True for `http://` and `https://` locations; anything else is a file path.
fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/delay_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("delay_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", LevelFilter::INFO));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut catalog = SourceCatalog::builtin();
    if let Ok(path) = std::env::var("DELAY_SOURCES_PATH") {
        catalog.extend_from_file(&path)?;
        info!(path = %path, "Loaded source catalog");
    }

    match cli.command {
        Commands::Analyze {
            sources,
            mode,
            output_dir,
            exclude_hours,
            skip_malformed,
            json,
        } => {
            let records = load_records(&sources, &catalog, row_policy(skip_malformed)).await?;
            run_analysis(&records, mode, &output_dir, exclude_hours, json)?;
        }
        Commands::Breakdown {
            sources,
            exclude_hours,
            skip_malformed,
        } => {
            let records = load_records(&sources, &catalog, row_policy(skip_malformed)).await?;
            let counts = breakdown(&bucketize(&records, exclude_hours));

            let mut out = std::io::stdout().lock();
            write_breakdown(&mut out, &counts)?;
        }
        Commands::ListSources => {
            for (name, location) in catalog.iter() {
                info!(name, location, "Source");
            }
        }
    }

    Ok(())
}

/// Loads source data from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %url))]
async fn fetcher(url: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(url) {
        let client = BasicClient::new();
        fetch_bytes(&client, url).await?
    } else {
        tokio::fs::read(url)
            .await
            .with_context(|| format!("failed to read {url}"))?
    };
    Ok(bytes)
}

/// Loads every source concurrently and merges them in the order given.
#[tracing::instrument(skip_all, fields(sources = sources.len()))]
async fn load_records(
    sources: &[String],
    catalog: &SourceCatalog,
    policy: RowPolicy,
) -> Result<RecordSet> {
    let mut tasks = vec![];

    for source in sources {
        let location = catalog.resolve(source).to_string();
        let source = source.clone();
        let span = tracing::info_span!("load_source", source = %source, location = %location);

        let task = tokio::spawn(
            async move {
                let bytes = fetcher(&location)
                    .await
                    .with_context(|| format!("failed to load source '{source}'"))?;
                let records = parse_records(&bytes, policy)
                    .with_context(|| format!("failed to parse source '{source}'"))?;
                info!(records = records.len(), "Source loaded");
                anyhow::Ok(records)
            }
            .instrument(span),
        );

        tasks.push(task);
    }

    // Await in submission order so the merge follows the command line
    let mut sets = Vec::with_capacity(tasks.len());
    for task in tasks {
        sets.push(task.await??);
    }

    let merged = RecordSet::merge(sets);
    info!(records = merged.len(), "Merged sources");
    Ok(merged)
}

/// Runs the pipeline, prints the summaries and writes both tables.
#[tracing::instrument(skip(records), fields(records = records.len()))]
fn run_analysis(
    records: &RecordSet,
    mode: Mode,
    output_dir: &str,
    exclude_hours: Option<HourRange>,
    json: bool,
) -> Result<()> {
    let report = analyze(records, exclude_hours);
    print_pretty(&report);

    {
        let mut out = std::io::stdout().lock();
        writeln!(out, "Zero delay records: {}", report.zero_delay_records)?;
        writeln!(out, "Non-zero delay records: {}", report.non_zero_delay_records)?;
        write_average_summary(&mut out, &report.average_delay)?;
        write_frequency_summary(&mut out, &report.frequency)?;
    }

    if json {
        print_json(&report)?;
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {output_dir}"))?;
    let (average_path, frequency_path) = report_paths(output_dir, mode.prefix());

    write_table(&average_path, &DenseTable::from_map(&report.average_delay))?;
    write_table(&frequency_path, &DenseTable::from_map(&report.frequency))?;

    info!(output_dir, mode = mode.prefix(), "Finished delay analysis");
    Ok(())
}
