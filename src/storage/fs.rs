use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::{LATEST_SNAPSHOT_FILE, SNAPSHOT_PREFIX};
use crate::domain::Snapshot;
use crate::error::Result;
use crate::storage::{PersistedSnapshot, SnapshotStore};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Filesystem-backed snapshot store.
///
/// Each persist writes a timestamped historical file and then replaces the
/// fixed "latest" file through a write-then-rename, so a reader never
/// observes a half-written latest document. Historical files older than
/// `max_age_days` are swept during persist; the latest pointer is never
/// swept.
pub struct FsSnapshotStore {
    data_dir: PathBuf,
    keep_history: bool,
    max_age_days: u32,
}

impl FsSnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            keep_history: true,
            max_age_days: 90,
        }
    }

    /// Toggle the timestamped historical copy. When off, only the latest
    /// pointer is written.
    pub fn keep_history(mut self, keep: bool) -> Self {
        self.keep_history = keep;
        self
    }

    /// Age limit for historical files, in days. Zero disables the sweep.
    pub fn max_age_days(mut self, days: u32) -> Self {
        self.max_age_days = days;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn latest_path(&self) -> PathBuf {
        self.data_dir.join(LATEST_SNAPSHOT_FILE)
    }

    fn write_atomic(path: &Path, content: &str) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Delete historical snapshot files older than the age limit. Files
    /// whose names do not carry a parseable timestamp are left alone.
    fn sweep_history(&self) -> Result<usize> {
        if self.max_age_days == 0 {
            return Ok(0);
        }
        let cutoff = Utc::now().naive_utc() - chrono::Duration::days(self.max_age_days as i64);

        let mut removed = 0;
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name == LATEST_SNAPSHOT_FILE {
                continue;
            }
            let stamp = match name
                .strip_prefix(SNAPSHOT_PREFIX)
                .and_then(|rest| rest.strip_suffix(".json"))
            {
                Some(stamp) => stamp,
                None => continue,
            };
            let written_at = match NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT) {
                Ok(parsed) => parsed,
                Err(_) => continue,
            };
            if written_at >= cutoff {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    debug!("Swept expired snapshot {}", name);
                    removed += 1;
                }
                Err(e) => warn!("Could not sweep snapshot {}: {}", name, e),
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl SnapshotStore for FsSnapshotStore {
    async fn persist(&self, snapshot: &Snapshot) -> Result<PersistedSnapshot> {
        fs::create_dir_all(&self.data_dir)?;

        let json_content = serde_json::to_string_pretty(snapshot)?;

        let snapshot_file = if self.keep_history {
            let timestamp = Utc::now().format(TIMESTAMP_FORMAT);
            let filename = format!("{SNAPSHOT_PREFIX}{timestamp}.json");
            fs::write(self.data_dir.join(&filename), &json_content)?;
            filename
        } else {
            LATEST_SNAPSHOT_FILE.to_string()
        };

        Self::write_atomic(&self.latest_path(), &json_content)?;
        debug!(
            "Persisted snapshot to {} and {}",
            snapshot_file, LATEST_SNAPSHOT_FILE
        );

        if let Err(e) = self.sweep_history() {
            warn!("Snapshot retention sweep failed: {}", e);
        }

        Ok(PersistedSnapshot {
            snapshot_file,
            latest_file: LATEST_SNAPSHOT_FILE.to_string(),
        })
    }

    async fn load_latest(&self) -> Result<Option<Snapshot>> {
        let bytes = match fs::read(self.latest_path()) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(snapshot))
    }
}
