use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use latmeter_core::log::{append_session, load_table, DEFAULT_LOG_PATH};
use latmeter_core::probe::{validate_url, HttpClient, LatencySession};
use latmeter_core::stats::{overall_statistics, per_url_statistics, report};
use latmeter_core::table::LOG_COLUMNS;
use latmeter_core::{FilterOutcome, LatencyTable, LatmeterError};

#[derive(Parser)]
#[command(name = "latmeter", version, about = "URL latency testing and analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe one or more URLs and append a session row per URL to the log.
    Run {
        /// Target URL; repeat the flag to test several in sequence.
        #[arg(long = "url", required = true)]
        urls: Vec<String>,
        /// Attempts per session.
        #[arg(long, default_value_t = 5)]
        attempts: u32,
        /// Per-request timeout in seconds.
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
        /// Session tag (network name, environment, ...).
        #[arg(long, default_value = "Default")]
        label: String,
        #[arg(long, default_value = DEFAULT_LOG_PATH)]
        log: PathBuf,
    },
    /// Load the log and print per-URL and overall statistics.
    Report {
        #[arg(long, default_value = DEFAULT_LOG_PATH)]
        log: PathBuf,
        /// Emit the statistics as pretty-printed JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Equality-filter the log rows on one column.
    Query {
        #[arg(long)]
        column: String,
        #[arg(long)]
        value: String,
        #[arg(long, default_value = DEFAULT_LOG_PATH)]
        log: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<(), LatmeterError> {
    match cli.command {
        Command::Run {
            urls,
            attempts,
            timeout_secs,
            label,
            log,
        } => run_sessions(&urls, attempts, timeout_secs, &label, &log).await,
        Command::Report { log, json } => print_report(&log, json),
        Command::Query { column, value, log } => query_log(&log, &column, &value),
    }
}

async fn run_sessions(
    urls: &[String],
    attempts: u32,
    timeout_secs: u64,
    label: &str,
    log: &Path,
) -> Result<(), LatmeterError> {
    // Validate everything up front so a typo in the second URL does not
    // waste the first URL's session.
    let urls = urls
        .iter()
        .map(|u| validate_url(u))
        .collect::<Result<Vec<_>, _>>()?;

    let client = HttpClient::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;

    for url in urls {
        let session = LatencySession::new(url, attempts, label);
        tracing::info!(url = session.url(), attempts, "session started");

        let outcomes = session.run(&client).await;
        for outcome in &outcomes {
            println!("{outcome}");
        }

        let row = session.summarize(&outcomes);
        println!(
            "{}: {}/{} ok, min {} max {} avg {}",
            row.url,
            row.successes,
            row.attempts,
            fmt_ms(row.min_ms),
            fmt_ms(row.max_ms),
            fmt_ms(row.avg_ms),
        );
        append_session(log, &row)?;
    }
    Ok(())
}

fn print_report(log: &Path, json: bool) -> Result<(), LatmeterError> {
    let table = load_table(log)?;
    let overall = overall_statistics(&table)?;
    let per_url = per_url_statistics(&table)?;

    if json {
        let out = report::export_json(&overall, &per_url)
            .map_err(|e| LatmeterError::stats("export_json", e.to_string()))?;
        println!("{out}");
    } else {
        println!("Data from {}\n", log.display());
        print!("{}", report::render_report(&overall, &per_url));
    }
    Ok(())
}

fn query_log(log: &Path, column: &str, value: &str) -> Result<(), LatmeterError> {
    let table = load_table(log)?;
    match table.filter_by_value(column, value) {
        FilterOutcome::Rows(matched) => print_rows(&matched),
        FilterOutcome::UnknownColumn => println!("column does not exist: {column}"),
        FilterOutcome::NoMatch => println!("no rows found for {column} == {}", value.trim()),
    }
    Ok(())
}

fn print_rows(table: &LatencyTable) {
    println!("{}", LOG_COLUMNS.join(","));
    for row in table.rows() {
        let cells: Vec<String> = LOG_COLUMNS
            .iter()
            .map(|col| row.cell(col).unwrap_or_default())
            .collect();
        println!("{}", cells.join(","));
    }
}

fn fmt_ms(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}ms"),
        None => "n/a".to_string(),
    }
}
