use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use tracing::{error, info, warn, Level};

use backup_rotate::config::Settings;
use backup_rotate::prelude::*;
use backup_rotate::rotation::plan_rotation;
use backup_rotate::storage::TierStore;

#[derive(Parser, Debug)]
#[command(
    name = "backup_rotate",
    version,
    about = "Rotate dated backup files across daily/weekly/monthly/yearly retention tiers"
)]
struct Cli {
    /// Root directory containing the tier folders; overrides the configured root
    #[arg(long)]
    root: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=3))]
    verbosity: u8,

    /// Compute and report the plan without touching the filesystem
    #[arg(long)]
    dry_run: bool,

    /// Print the computed plan as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbosity);

    match run(cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

/// One rotation pass: scan, plan, report, apply. Returns the number of
/// per-file errors encountered during the apply phase.
fn run(cli: Cli) -> Result<usize> {
    info!("File rotation started");

    let settings = Settings::new()?;
    let root = cli.root.unwrap_or(settings.root);
    info!("Rotating under {:?}", root);

    let store = TierStore::new(root);
    store.ensure_layout()?;

    let today = Local::now().date_naive();
    let (files, skipped) = store.scan()?;
    for s in &skipped {
        warn!("Leaving {:?} in {} untouched: {}", s.name, s.tier, s.reason);
    }

    let plan = plan_rotation(&files, today);
    for r in &plan.rejected {
        warn!("Skipping {:?}: {}", r.file, r.reason);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&plan.decisions)?);
    }

    let report = store.apply(&plan.decisions, today, cli.dry_run);
    info!(
        "File rotation completed {} (moved {}, quarantined {}, deleted {}, errors {})",
        if report.errors == 0 {
            "successfully"
        } else {
            "with errors"
        },
        report.moved,
        report.quarantined,
        report.deleted,
        report.errors
    );

    Ok(report.errors)
}
