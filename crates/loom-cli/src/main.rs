//! Command-line harness for the Loom.
//!
//! Reads raw thread records, optionally applies author interventions and a
//! chapter advance, then prints (or appends) the evaluation report.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use loom::{default_config_toml, Loom, LoomReport, ReportWriter, ThreadLedger};
use loom_events::{Intervention, RawThread};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command line arguments for the Loom
#[derive(Parser, Debug)]
#[command(name = "loom")]
#[command(about = "Narrative-thread prioritization: which threads must the next chapter carry")]
struct Args {
    /// JSON array of raw thread records
    #[arg(long, required_unless_present = "print_default_config")]
    threads: Option<PathBuf>,

    /// Current chapter
    #[arg(long, default_value_t = 1)]
    chapter: u32,

    /// TOML configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of author interventions applied before evaluation
    #[arg(long)]
    interventions: Option<PathBuf>,

    /// Advance every thread to the current chapter before evaluating
    #[arg(long)]
    advance: bool,

    /// Append the report to <DIR>/loom_reports.jsonl instead of printing it
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let loom = match &args.config {
        Some(path) => Loom::from_config_file(path)?,
        None => Loom::with_defaults(),
    };

    let threads_path = args.threads.as_ref().ok_or("--threads is required")?;
    let raws = RawThread::parse_batch(&fs::read_to_string(threads_path)?)?;

    let batch = loom.ingest(&raws, args.chapter);
    for (index, reason) in &batch.rejected {
        warn!(index, "skipping record: {}", reason);
    }

    let mut ledger = ThreadLedger::new();
    for thread in batch.admitted {
        if let Err(e) = ledger.ingest(thread) {
            warn!("skipping record: {}", e);
        }
    }

    if let Some(path) = &args.interventions {
        let interventions: Vec<Intervention> = serde_json::from_str(&fs::read_to_string(path)?)?;
        for intervention in &interventions {
            if let Err(e) = ledger.apply_intervention(intervention, args.chapter) {
                warn!(thread = %intervention.thread_id, "intervention skipped: {}", e);
            }
        }
    }

    let changes = if args.advance {
        ledger.advance_all(args.chapter, loom.config())
    } else {
        Vec::new()
    };

    let report = loom
        .evaluate(&ledger.snapshot(), args.chapter)
        .with_changes(changes);
    summarize(&report);

    match &args.output {
        Some(dir) => {
            let mut writer = ReportWriter::new(dir)?;
            writer.write(&report)?;
            writer.flush()?;
            info!(path = %writer.path().display(), "appended report");
        }
        None => println!("{}", report.to_json()?),
    }

    Ok(())
}

fn summarize(report: &LoomReport) {
    info!(
        chapter = report.chapter,
        threads = report.threads.len(),
        terminal = report.terminal_count,
        overall_health = report.overall_health,
        "evaluated story"
    );
    if report.selection.over_capacity {
        warn!("mandatory threads exceed the primary cap");
    }
    for line in &report.selection.reasoning {
        info!("primary: {}", line);
    }
}
