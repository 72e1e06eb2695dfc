use blobsweep_core::{AppError, AppResult};
use chrono::{DateTime, NaiveDate};

/// How the parser treats a `creationTime` value that is not an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// Reject the record with a malformed-record error.
    Strict,
    /// Coerce the value to the epoch, matching the legacy cleanup script.
    EpochFallback,
}

/// One metadata sidecar describing a single blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRecord {
    repository_name: String,
    creation_time_seconds: i64,
    blob_path: String,
    deleted: bool,
}

impl BlobRecord {
    /// Parses one sidecar's raw text into a best-effort record.
    ///
    /// The `repo-name`, `creationTime` and `blob-name` markers are recognized
    /// by substring containment; the value is everything after the first `=`
    /// on the matching line, and later matching lines overwrite earlier ones.
    /// Missing fields default to empty/zero and are not an error. A line
    /// containing `deleted=true` marks the record deleted permanently.
    ///
    /// A `creationTime` value that is present but not an integer fails with
    /// [`AppError::MalformedRecord`] under [`TimestampPolicy::Strict`]; the
    /// stored millisecond timestamp is truncated to whole seconds.
    pub fn parse(raw: &str, policy: TimestampPolicy) -> AppResult<Self> {
        let mut repository_name = String::new();
        let mut creation_time_seconds = 0_i64;
        let mut blob_path = String::new();
        let mut deleted = false;

        for line in raw.lines() {
            if line.contains("repo-name") {
                repository_name = line_value(line);
            }
            if line.contains("creationTime") {
                let value = line_value(line);
                let millis = match value.parse::<i64>() {
                    Ok(millis) => millis,
                    Err(_) if policy == TimestampPolicy::EpochFallback => 0,
                    Err(error) => {
                        return Err(AppError::MalformedRecord(format!(
                            "creationTime value '{value}' is not an integer: {error}"
                        )));
                    }
                };
                creation_time_seconds = millis / 1000;
            }
            if line.contains("blob-name") {
                blob_path = line_value(line);
            }
            if line.contains("deleted=true") {
                deleted = true;
            }
        }

        if DateTime::from_timestamp(creation_time_seconds, 0).is_none() {
            return Err(AppError::MalformedRecord(format!(
                "creationTime {creation_time_seconds}s is outside the representable date range"
            )));
        }

        Ok(Self {
            repository_name,
            creation_time_seconds,
            blob_path,
            deleted,
        })
    }

    /// Returns the owning repository name, empty when absent.
    #[must_use]
    pub fn repository_name(&self) -> &str {
        self.repository_name.as_str()
    }

    /// Returns the blob creation time in whole seconds since the epoch.
    #[must_use]
    pub fn creation_time_seconds(&self) -> i64 {
        self.creation_time_seconds
    }

    /// Returns the blob path matched against rule patterns.
    #[must_use]
    pub fn blob_path(&self) -> &str {
        self.blob_path.as_str()
    }

    /// Returns whether the record already carries a deletion mark.
    #[must_use]
    pub fn deleted(&self) -> bool {
        self.deleted
    }

    /// Returns the creation instant truncated to a calendar date.
    #[must_use]
    pub fn creation_date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.creation_time_seconds, 0).map(|instant| instant.date_naive())
    }
}

fn line_value(line: &str) -> String {
    line.split_once('=')
        .map(|(_, value)| value.to_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use blobsweep_core::{AppError, AppResult};

    use super::{BlobRecord, TimestampPolicy};

    #[test]
    fn parses_all_four_markers() -> AppResult<()> {
        let raw = "repo-name=repoA\ncreationTime=1700000000123\nblob-name=build/out.jar\n";
        let record = BlobRecord::parse(raw, TimestampPolicy::Strict)?;

        assert_eq!(record.repository_name(), "repoA");
        assert_eq!(record.creation_time_seconds(), 1_700_000_000);
        assert_eq!(record.blob_path(), "build/out.jar");
        assert!(!record.deleted());
        Ok(())
    }

    #[test]
    fn missing_fields_default_to_empty_and_zero() -> AppResult<()> {
        let record = BlobRecord::parse("size=42\n", TimestampPolicy::Strict)?;

        assert_eq!(record.repository_name(), "");
        assert_eq!(record.creation_time_seconds(), 0);
        assert_eq!(record.blob_path(), "");
        assert!(!record.deleted());
        Ok(())
    }

    #[test]
    fn deleted_line_anywhere_marks_the_record() -> AppResult<()> {
        let raw = "deleted=true\nrepo-name=repoA\n";
        let record = BlobRecord::parse(raw, TimestampPolicy::Strict)?;

        assert!(record.deleted());
        Ok(())
    }

    #[test]
    fn later_lines_cannot_unset_the_deletion_mark() -> AppResult<()> {
        let raw = "deleted=true\ndeleted=false\n";
        let record = BlobRecord::parse(raw, TimestampPolicy::Strict)?;

        assert!(record.deleted());
        Ok(())
    }

    #[test]
    fn later_matching_lines_overwrite_earlier_values() -> AppResult<()> {
        let raw = "repo-name=first\nrepo-name=second\n";
        let record = BlobRecord::parse(raw, TimestampPolicy::Strict)?;

        assert_eq!(record.repository_name(), "second");
        Ok(())
    }

    #[test]
    fn value_is_everything_after_the_first_equals() -> AppResult<()> {
        let raw = "blob-name=path/with=equals\n";
        let record = BlobRecord::parse(raw, TimestampPolicy::Strict)?;

        assert_eq!(record.blob_path(), "path/with=equals");
        Ok(())
    }

    #[test]
    fn marker_line_without_equals_yields_empty_value() -> AppResult<()> {
        let record = BlobRecord::parse("repo-name repoA\n", TimestampPolicy::Strict)?;

        assert_eq!(record.repository_name(), "");
        Ok(())
    }

    #[test]
    fn millisecond_timestamp_is_floor_divided() -> AppResult<()> {
        let record = BlobRecord::parse("creationTime=1999\n", TimestampPolicy::Strict)?;

        assert_eq!(record.creation_time_seconds(), 1);
        Ok(())
    }

    #[test]
    fn non_integer_timestamp_is_malformed_under_strict_policy() {
        let result = BlobRecord::parse("creationTime=yesterday\n", TimestampPolicy::Strict);

        assert!(matches!(result, Err(AppError::MalformedRecord(_))));
    }

    #[test]
    fn non_integer_timestamp_becomes_epoch_under_fallback_policy() -> AppResult<()> {
        let record = BlobRecord::parse("creationTime=yesterday\n", TimestampPolicy::EpochFallback)?;

        assert_eq!(record.creation_time_seconds(), 0);
        Ok(())
    }

    #[test]
    fn unrepresentable_timestamp_is_malformed() {
        let raw = format!("creationTime={}\n", i64::MAX);
        let result = BlobRecord::parse(raw.as_str(), TimestampPolicy::Strict);

        assert!(matches!(result, Err(AppError::MalformedRecord(_))));
    }
}
