use chrono::NaiveDate;

use crate::record::BlobRecord;
use crate::rule::RetentionRule;

/// One rule whose age threshold a record exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredRule {
    /// Pattern source text of the triggering rule.
    pub pattern: String,
    /// Configured keep threshold in days.
    pub max_age_days: i64,
    /// Computed record age in whole calendar days.
    pub age_in_days: i64,
}

/// Outcome of evaluating one record against its matched rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetentionDecision {
    /// No rule triggered; the record is left untouched.
    Keep,
    /// At least one rule triggered; every triggering rule is reported.
    Delete(Vec<TriggeredRule>),
}

/// Decides whether a record has outlived any of its matched rules.
///
/// Age is the whole-calendar-day difference between the creation date and
/// `today`; the time-of-day component of the creation instant is discarded
/// before subtracting. A rule triggers only on strict inequality
/// (`age_in_days > max_age_days`). Records already marked deleted are
/// filtered upstream and never reach this function.
#[must_use]
pub fn evaluate_retention(
    record: &BlobRecord,
    matched_rules: &[&RetentionRule],
    today: NaiveDate,
) -> RetentionDecision {
    let Some(creation_date) = record.creation_date() else {
        return RetentionDecision::Keep;
    };

    let age_in_days = (today - creation_date).num_days();
    let triggered: Vec<TriggeredRule> = matched_rules
        .iter()
        .filter(|rule| age_in_days > rule.max_age_days())
        .map(|rule| TriggeredRule {
            pattern: rule.pattern().to_owned(),
            max_age_days: rule.max_age_days(),
            age_in_days,
        })
        .collect();

    if triggered.is_empty() {
        RetentionDecision::Keep
    } else {
        RetentionDecision::Delete(triggered)
    }
}

#[cfg(test)]
mod tests {
    use blobsweep_core::AppResult;
    use chrono::{Days, NaiveDate};

    use super::{RetentionDecision, evaluate_retention};
    use crate::record::{BlobRecord, TimestampPolicy};
    use crate::rule::RetentionRule;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap_or_default()
    }

    fn record_created_days_ago(days: u64, hour: u32) -> AppResult<BlobRecord> {
        let creation_date = today().checked_sub_days(Days::new(days)).unwrap_or_default();
        let creation_time = creation_date
            .and_hms_opt(hour, 17, 3)
            .unwrap_or_default()
            .and_utc()
            .timestamp_millis();
        let raw = format!("repo-name=repoA\ncreationTime={creation_time}\nblob-name=build/out.jar\n");
        BlobRecord::parse(raw.as_str(), TimestampPolicy::Strict)
    }

    #[test]
    fn age_is_whole_calendar_days_regardless_of_time_of_day() -> AppResult<()> {
        let rule = RetentionRule::new("build/", 44)?;

        // Created 45 days ago late in the day: still 45 calendar days old.
        let record = record_created_days_ago(45, 23)?;
        let decision = evaluate_retention(&record, &[&rule], today());

        match decision {
            RetentionDecision::Delete(triggered) => {
                assert_eq!(triggered.len(), 1);
                assert_eq!(triggered[0].age_in_days, 45);
            }
            RetentionDecision::Keep => panic!("expected a delete decision"),
        }
        Ok(())
    }

    #[test]
    fn age_equal_to_threshold_does_not_trigger() -> AppResult<()> {
        let rule = RetentionRule::new("build/", 30)?;
        let record = record_created_days_ago(30, 0)?;

        let decision = evaluate_retention(&record, &[&rule], today());

        assert_eq!(decision, RetentionDecision::Keep);
        Ok(())
    }

    #[test]
    fn age_one_past_threshold_triggers() -> AppResult<()> {
        let rule = RetentionRule::new("build/", 30)?;
        let record = record_created_days_ago(31, 12)?;

        let decision = evaluate_retention(&record, &[&rule], today());

        assert!(matches!(decision, RetentionDecision::Delete(_)));
        Ok(())
    }

    #[test]
    fn no_matched_rules_keeps_the_record() -> AppResult<()> {
        let record = record_created_days_ago(400, 12)?;

        let decision = evaluate_retention(&record, &[], today());

        assert_eq!(decision, RetentionDecision::Keep);
        Ok(())
    }

    #[test]
    fn every_triggering_rule_is_reported() -> AppResult<()> {
        let loose = RetentionRule::new("build", 10)?;
        let tight = RetentionRule::new("\\.jar$", 20)?;
        let future = RetentionRule::new("build", 90)?;
        let record = record_created_days_ago(45, 12)?;

        let decision = evaluate_retention(&record, &[&loose, &tight, &future], today());

        match decision {
            RetentionDecision::Delete(triggered) => {
                let patterns: Vec<&str> =
                    triggered.iter().map(|rule| rule.pattern.as_str()).collect();
                assert_eq!(patterns, vec!["build", "\\.jar$"]);
            }
            RetentionDecision::Keep => panic!("expected a delete decision"),
        }
        Ok(())
    }

    #[test]
    fn epoch_creation_time_computes_a_very_large_age() -> AppResult<()> {
        let rule = RetentionRule::new("build/", 365)?;
        let raw = "repo-name=repoA\ncreationTime=0\nblob-name=build/out.jar\n";
        let record = BlobRecord::parse(raw, TimestampPolicy::Strict)?;

        let decision = evaluate_retention(&record, &[&rule], today());

        assert!(matches!(decision, RetentionDecision::Delete(_)));
        Ok(())
    }
}
