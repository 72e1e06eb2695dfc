//! Retention sweep over a blob-store metadata tree.

#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blobsweep_application::{SweepInput, SweepMode, SweepReport, SweepService};
use blobsweep_core::AppError;
use blobsweep_domain::TimestampPolicy;
use blobsweep_infrastructure::{FsMetadataStore, load_rule_set};

/// Marks blobs as logically deleted once they outlive their retention rules.
#[derive(Debug, Parser)]
#[command(name = "blobsweep", version, about)]
struct Cli {
    /// Rule file mapping repository names to retention rules.
    #[arg(short, long, default_value = "rules.json")]
    rules: PathBuf,

    /// Root directory of the metadata tree to process.
    #[arg(short, long)]
    path: PathBuf,

    /// Report would-be deletions without mutating any file.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Treat unparseable creation timestamps as the epoch instead of failing,
    /// matching the legacy cleanup script.
    #[arg(long, default_value_t = false)]
    epoch_fallback: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_tracing();
    let cli = Cli::parse();

    let rule_set = load_rule_set(cli.rules.as_path())?;
    let store = Arc::new(FsMetadataStore::new(cli.path.clone())?);
    let service = SweepService::new(store, rule_set);

    let mode = if cli.dry_run {
        SweepMode::DryRun
    } else {
        SweepMode::Apply
    };
    let timestamp_policy = if cli.epoch_fallback {
        TimestampPolicy::EpochFallback
    } else {
        TimestampPolicy::Strict
    };

    info!(
        path = %cli.path.display(),
        rules = %cli.rules.display(),
        dry_run = cli.dry_run,
        "starting retention sweep"
    );

    let report = service
        .run(SweepInput {
            today: Utc::now().date_naive(),
            mode,
            timestamp_policy,
        })
        .await?;

    print_report(&report, mode);
    Ok(())
}

fn print_report(report: &SweepReport, mode: SweepMode) {
    if mode == SweepMode::DryRun {
        for dry_run_match in &report.dry_run_matches {
            println!("file:       {}", dry_run_match.record_id);
            println!("repository: {}", dry_run_match.repository_name);
            println!("blob:       {}", dry_run_match.blob_path);
            println!("pattern:    {}", dry_run_match.pattern);
            println!("max days:   {}", dry_run_match.max_age_days);
            println!("age days:   {}", dry_run_match.age_in_days);
            println!("----------------------------------------");
        }
    }

    println!(
        "swept {} records in {:.2?}: {} marked, {} already deleted, {} failed",
        report.scanned_count,
        report.elapsed,
        report.processed_count,
        report.skipped_count,
        report.failure_count()
    );
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
