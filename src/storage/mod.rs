// Snapshot persistence: filesystem store plus an in-memory store for tests

mod fs;
mod memory;

pub use fs::FsSnapshotStore;
pub use memory::InMemorySnapshotStore;

use async_trait::async_trait;

use crate::domain::Snapshot;
use crate::error::Result;

/// Where a persisted snapshot landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSnapshot {
    /// Name of the timestamped historical artifact. Equals `latest_file`
    /// when history writing is disabled.
    pub snapshot_file: String,
    /// Name of the always-current pointer artifact.
    pub latest_file: String,
}

/// Storage boundary for aggregated snapshots.
///
/// A store holds at most one "latest" snapshot; each persist supersedes the
/// previous one wholesale. If two persists race, the last writer wins.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Write the snapshot under a fresh timestamped name and repoint
    /// "latest" at the same content.
    async fn persist(&self, snapshot: &Snapshot) -> Result<PersistedSnapshot>;

    /// The snapshot most recently written as "latest", or `None` when no
    /// ingestion has ever completed.
    async fn load_latest(&self) -> Result<Option<Snapshot>>;
}
