use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskshare::abstractions::RealTableStore;
use taskshare::config::{load_config, DistributionConfig};
use taskshare::distribution::{weight_classes, RunDate};
use taskshare::pipeline::{self, RunOptions, RunReport};
use taskshare::table::TableFormat;
use taskshare::error::describe_error_code;
use taskshare::TaskShareError;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::EnvFilter;

/// Split pending task spreadsheets among workers
#[derive(Parser)]
#[command(name = "taskshare")]
#[command(version)]
#[command(about = "Split pending task spreadsheets among workers by login ownership and weighted quotas", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distribute the input spreadsheet and build each worker's final file
    Run {
        /// Spreadsheet (or CSV) with the pending tasks
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory, created if absent
        #[arg(short, long)]
        output: PathBuf,

        /// Date stamp for file names (YYYYMMDD, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Output file format (default: from configuration)
        #[arg(long, value_enum)]
        format: Option<TableFormat>,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Rebuild final files from worker files already in a directory
    Combine {
        /// Directory holding the worker files
        #[arg(short, long)]
        output: PathBuf,

        /// Date stamp for file names (YYYYMMDD, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Output file format (default: from configuration)
        #[arg(long, value_enum)]
        format: Option<TableFormat>,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,calamine=debug",
    };

    let filter = std::env::var("TASKSHARE_LOG")
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("taskshare started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = dispatch(cli) {
        error!("Fatal error: {:#}", e);
        let code = match e.downcast_ref::<TaskShareError>() {
            Some(err) => {
                eprintln!("Error: {}", err.user_message());
                eprintln!("  [E{:04}] {}", err.code(), describe_error_code(err.code()));
                err.exit_code()
            }
            None => {
                eprintln!("Error: {:#}", e);
                1
            }
        };
        std::process::exit(code);
    }
}

fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            input,
            output,
            date,
            format,
            json,
        } => run_distribution(&config, input, output, date, format, json),
        Commands::Combine {
            output,
            date,
            format,
        } => run_combine(&config, output, date, format),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn run_date(date: Option<String>) -> anyhow::Result<RunDate> {
    match date {
        Some(value) => Ok(RunDate::parse(&value)?),
        None => Ok(RunDate::today()),
    }
}

fn run_distribution(
    config: &DistributionConfig,
    input: PathBuf,
    output: PathBuf,
    date: Option<String>,
    format: Option<TableFormat>,
    json: bool,
) -> anyhow::Result<()> {
    let options = RunOptions {
        input,
        output_dir: output,
        date: run_date(date)?,
        format: format.unwrap_or(config.output.format),
    };

    for (weight, names) in weight_classes(&config.workers) {
        debug!(weight = weight.0, workers = ?names, "Weight class");
    }

    let report = pipeline::run(&RealTableStore::new(), config, &options)?;
    log_summary(&report);

    if json {
        let rendered =
            serde_json::to_string_pretty(&report).context("Failed to render run report")?;
        println!("{}", rendered);
    }

    Ok(())
}

fn run_combine(
    config: &DistributionConfig,
    output: PathBuf,
    date: Option<String>,
    format: Option<TableFormat>,
) -> anyhow::Result<()> {
    let date = run_date(date)?;
    let format = format.unwrap_or(config.output.format);

    let report =
        pipeline::combine_existing(&RealTableStore::new(), config, &output, &date, format)?;

    for file in &report.written {
        info!(worker = %file.owner, rows = file.rows, path = %file.path.display(), "Final file");
    }
    for skipped in &report.skipped {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "Skipped file");
    }
    info!(
        final_files = report.written.len(),
        without_output = report.without_output.len(),
        "Combine complete"
    );

    Ok(())
}

fn log_summary(report: &RunReport) {
    if let Some(allocation) = &report.allocation {
        for worker in &allocation.workers {
            info!(
                worker = %worker.worker,
                direct = worker.direct,
                allocated = worker.allocated,
                quota = worker.quota,
                "Allocation"
            );
        }
        if allocation.unassigned > 0 {
            warn!(
                unassigned = allocation.unassigned,
                unclaimed = allocation.unclaimed,
                "Rows left unassigned by quota rounding"
            );
        }
    }

    for skipped in &report.skipped {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "Skipped file");
    }

    info!(
        input_rows = report.input_rows,
        direct_files = report.direct_files.len(),
        combined_files = report.combined_files.len(),
        final_files = report.final_files.len(),
        skipped = report.skipped.len(),
        "Run complete"
    );
}
