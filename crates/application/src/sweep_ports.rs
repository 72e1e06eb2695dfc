use async_trait::async_trait;
use blobsweep_core::AppResult;

/// Storage port for blob metadata sidecars and the run-level marker.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Lists every record source in deterministic order.
    ///
    /// Returned identifiers are opaque to the sweep and passed back to the
    /// other operations; the filesystem adapter uses resolved file paths.
    async fn list_records(&self) -> AppResult<Vec<String>>;

    /// Reads the full raw text of one record.
    async fn read_record(&self, record_id: &str) -> AppResult<String>;

    /// Appends exactly one `deleted=true` line to the record.
    ///
    /// Existing lines are never rewritten or removed.
    async fn append_deleted_mark(&self, record_id: &str) -> AppResult<()>;

    /// Ensures the run-level rebuild marker is present.
    ///
    /// The marker line is appended only when an identical line does not
    /// already exist, so repeated runs never duplicate it.
    async fn ensure_rebuild_marker(&self) -> AppResult<()>;
}
