use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{info, warn};

use blobsweep_core::AppResult;
use blobsweep_domain::{
    BlobRecord, RetentionDecision, RuleSet, TimestampPolicy, evaluate_retention,
};

use crate::sweep_ports::MetadataStore;


/// Whether the sweep persists deletion marks or only reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepMode {
    /// Persist deletion marks and set the rebuild marker.
    Apply,
    /// Report would-be deletions without mutating storage.
    DryRun,
}

/// Parameters for one sweep invocation.
#[derive(Debug, Clone, Copy)]
pub struct SweepInput {
    /// Calendar date record ages are computed against.
    pub today: NaiveDate,
    /// Apply or dry-run.
    pub mode: SweepMode,
    /// Parser behavior for non-integer creation timestamps.
    pub timestamp_policy: TimestampPolicy,
}

/// One would-be deletion reported in dry-run mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunMatch {
    /// Resolved record source identifier (file path).
    pub record_id: String,
    /// Owning repository name.
    pub repository_name: String,
    /// Blob path the pattern matched.
    pub blob_path: String,
    /// Pattern source text of the triggering rule.
    pub pattern: String,
    /// Configured keep threshold in days.
    pub max_age_days: i64,
    /// Computed record age in whole calendar days.
    pub age_in_days: i64,
}

/// One record the sweep could not fully handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    /// Record source identifier.
    pub record_id: String,
    /// Human-readable failure cause.
    pub message: String,
}

/// Aggregated outcome of one sweep run.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Number of record sources discovered and visited.
    pub scanned_count: u64,
    /// Number of records marked deleted (or reported in dry-run mode).
    pub processed_count: u64,
    /// Number of records skipped because they were already deleted.
    pub skipped_count: u64,
    /// Records that failed to parse or persist; never aborts the run.
    pub failures: Vec<SweepFailure>,
    /// Per-rule deletion reports collected in dry-run mode.
    pub dry_run_matches: Vec<DryRunMatch>,
    /// Whether the rebuild marker was ensured at the end of the run.
    pub rebuild_marker_set: bool,
    /// Failure message when the rebuild marker could not be written.
    pub marker_failure: Option<String>,
    /// Elapsed wall time of the run.
    pub elapsed: Duration,
}

impl SweepReport {
    /// Returns the number of records that failed to parse or persist.
    #[must_use]
    pub fn failure_count(&self) -> u64 {
        u64::try_from(self.failures.len()).unwrap_or(u64::MAX)
    }
}

/// Application service orchestrating one retention sweep.
#[derive(Clone)]
pub struct SweepService {
    store: Arc<dyn MetadataStore>,
    rule_set: RuleSet,
}

impl SweepService {
    /// Creates a sweep service over one metadata store and rule set.
    #[must_use]
    pub fn new(store: Arc<dyn MetadataStore>, rule_set: RuleSet) -> Self {
        Self { store, rule_set }
    }

    /// Runs one full sweep over every discovered record.
    ///
    /// Per-record failures are collected in the report and never abort the
    /// run; only failing to enumerate the record sources is fatal. The
    /// rebuild marker is ensured once, after all records are handled, and
    /// only when at least one mark was applied for real.
    pub async fn run(&self, input: SweepInput) -> AppResult<SweepReport> {
        let started = Instant::now();
        let mut report = SweepReport::default();

        let record_ids = self.store.list_records().await?;
        for record_id in record_ids {
            report.scanned_count += 1;
            if let Err(error) = self.process_record(record_id.as_str(), input, &mut report).await {
                warn!(record_id = %record_id, error = %error, "record skipped after failure");
                report.failures.push(SweepFailure {
                    record_id,
                    message: error.to_string(),
                });
            }
        }

        if report.processed_count > 0 && input.mode == SweepMode::Apply {
            match self.store.ensure_rebuild_marker().await {
                Ok(()) => report.rebuild_marker_set = true,
                Err(error) => {
                    warn!(error = %error, "failed to set rebuild marker");
                    report.marker_failure = Some(error.to_string());
                }
            }
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }

    async fn process_record(
        &self,
        record_id: &str,
        input: SweepInput,
        report: &mut SweepReport,
    ) -> AppResult<()> {
        let raw = self.store.read_record(record_id).await?;
        let record = BlobRecord::parse(raw.as_str(), input.timestamp_policy)?;

        // Already-deleted records are immutable for this sweep.
        if record.deleted() {
            report.skipped_count += 1;
            return Ok(());
        }

        let matched = self
            .rule_set
            .matching_rules(record.repository_name(), record.blob_path());
        let RetentionDecision::Delete(triggered) =
            evaluate_retention(&record, matched.as_slice(), input.today)
        else {
            return Ok(());
        };

        match input.mode {
            SweepMode::Apply => {
                self.store.append_deleted_mark(record_id).await?;
                info!(
                    record_id = %record_id,
                    repository = %record.repository_name(),
                    blob_path = %record.blob_path(),
                    "marked blob deleted"
                );
            }
            SweepMode::DryRun => {
                for rule in triggered {
                    report.dry_run_matches.push(DryRunMatch {
                        record_id: record_id.to_owned(),
                        repository_name: record.repository_name().to_owned(),
                        blob_path: record.blob_path().to_owned(),
                        pattern: rule.pattern,
                        max_age_days: rule.max_age_days,
                        age_in_days: rule.age_in_days,
                    });
                }
            }
        }

        report.processed_count += 1;
        Ok(())
    }
}
