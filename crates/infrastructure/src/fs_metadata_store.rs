use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use blobsweep_application::MetadataStore;
use blobsweep_core::{AppError, AppResult};


/// Record file suffix recognized during traversal.
const RECORD_SUFFIX: &str = ".properties";

/// Marker file name at the tree root.
const MARKER_FILE: &str = "metadata.properties";

/// Marker line signaling the deleted-blob index needs a rebuild.
const REBUILD_MARKER_LINE: &str = "rebuildDeletedBlobIndex=true";

/// Deletion mark appended to record files.
const DELETED_MARK_LINE: &str = "deleted=true";

/// Filesystem adapter over a blob-store metadata tree.
///
/// Record identifiers are resolved file paths under the configured root.
/// Mutations are append-only: a `deleted=true` line on record files and a
/// single rebuild-marker line on the root marker file.
pub struct FsMetadataStore {
    root: PathBuf,
}

impl FsMetadataStore {
    /// Creates a store rooted at an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(AppError::Config(format!(
                "metadata path '{}' is not a directory",
                root.display()
            )));
        }

        Ok(Self { root })
    }

    fn marker_path(&self) -> PathBuf {
        self.root.join(MARKER_FILE)
    }
}

#[async_trait]
impl MetadataStore for FsMetadataStore {
    async fn list_records(&self) -> AppResult<Vec<String>> {
        let mut pending = vec![self.root.clone()];
        let mut records = Vec::new();

        while let Some(directory) = pending.pop() {
            let mut entries = fs::read_dir(&directory).await.map_err(|error| {
                AppError::Storage(format!(
                    "failed to read directory '{}': {error}",
                    directory.display()
                ))
            })?;

            loop {
                let entry = entries.next_entry().await.map_err(|error| {
                    AppError::Storage(format!(
                        "failed to enumerate '{}': {error}",
                        directory.display()
                    ))
                })?;
                let Some(entry) = entry else {
                    break;
                };

                let path = entry.path();
                let file_type = entry.file_type().await.map_err(|error| {
                    AppError::Storage(format!(
                        "failed to inspect '{}': {error}",
                        path.display()
                    ))
                })?;

                if file_type.is_dir() {
                    pending.push(path);
                } else if path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(RECORD_SUFFIX))
                {
                    records.push(path.to_string_lossy().into_owned());
                }
            }
        }

        records.sort();
        Ok(records)
    }

    async fn read_record(&self, record_id: &str) -> AppResult<String> {
        fs::read_to_string(record_id).await.map_err(|error| {
            AppError::Storage(format!("failed to read record '{record_id}': {error}"))
        })
    }

    async fn append_deleted_mark(&self, record_id: &str) -> AppResult<()> {
        append_line(Path::new(record_id), DELETED_MARK_LINE).await
    }

    async fn ensure_rebuild_marker(&self) -> AppResult<()> {
        let marker_path = self.marker_path();
        match fs::read_to_string(&marker_path).await {
            Ok(existing) if existing.lines().any(|line| line == REBUILD_MARKER_LINE) => {
                debug!(path = %marker_path.display(), "rebuild marker already present");
                return Ok(());
            }
            Ok(_) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => {
                return Err(AppError::Storage(format!(
                    "failed to read marker file '{}': {error}",
                    marker_path.display()
                )));
            }
        }

        append_line(marker_path.as_path(), REBUILD_MARKER_LINE).await
    }
}

async fn append_line(path: &Path, line: &str) -> AppResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|error| {
            AppError::Storage(format!(
                "failed to open '{}' for append: {error}",
                path.display()
            ))
        })?;

    file.write_all(format!("{line}\n").as_bytes())
        .await
        .map_err(|error| {
            AppError::Storage(format!("failed to append to '{}': {error}", path.display()))
        })?;
    file.flush().await.map_err(|error| {
        AppError::Storage(format!("failed to flush '{}': {error}", path.display()))
    })
}
