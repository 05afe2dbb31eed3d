use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use attendance_ledger::clock::SystemClock;
use attendance_ledger::service::{AttendanceService, QueryRequest, ReportOutcome, ReportRequest};
use attendance_ledger::store::AttendanceStore;
use attendance_ledger::{import, report};

#[derive(Parser)]
#[command(name = "attendance-ledger")]
#[command(about = "In-memory student attendance ledger with summary and CSV reports", long_about = None)]
struct Cli {
    /// Only log errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Log debug detail
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report over a built-in sample week
    Demo {
        #[arg(long)]
        export: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load mark events from a CSV file and report on them
    Report {
        #[arg(long)]
        events: PathBuf,
        /// Pass `csv` to write the tabular export instead of the summary
        #[arg(long)]
        export: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load mark events from a CSV file and print one student's history
    Query {
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        student_id: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let service = AttendanceService::new(Arc::new(AttendanceStore::new()), Arc::new(SystemClock));

    match cli.command {
        Commands::Demo { export, out } => {
            let inserted = import::seed(&service)?;
            tracing::debug!(inserted, "demo data seeded");
            emit_report(&service, ReportRequest { export }, out.as_deref())?;
        }
        Commands::Report {
            events,
            export,
            out,
        } => {
            import::import_csv(&service, &events)?;
            emit_report(&service, ReportRequest { export }, out.as_deref())?;
        }
        Commands::Query { events, student_id } => {
            import::import_csv(&service, &events)?;
            let response = service.query(QueryRequest {
                student_id: Some(student_id),
            })?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn emit_report(
    service: &AttendanceService,
    request: ReportRequest,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    match service.report(request)? {
        ReportOutcome::Csv(document) => {
            let filename = document.filename;
            let path = out.unwrap_or_else(|| Path::new(filename));
            std::fs::write(path, document.body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        ReportOutcome::Summary(summary) => {
            eprint!("{}", report::render_summary(&summary.report, &summary.data));
            let json = serde_json::to_string_pretty(&summary)?;
            match out {
                Some(path) => {
                    std::fs::write(path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Report written to {}.", path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ATTENDANCE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
