use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

use crate::constants::{LATEST_SNAPSHOT_FILE, SNAPSHOT_PREFIX};
use crate::domain::Snapshot;
use crate::error::Result;
use crate::storage::{PersistedSnapshot, SnapshotStore};

/// In-memory snapshot store for development and tests.
pub struct InMemorySnapshotStore {
    history: Arc<Mutex<Vec<(String, Snapshot)>>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn snapshot_count(&self) -> usize {
        self.history.lock().unwrap().len()
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn persist(&self, snapshot: &Snapshot) -> Result<PersistedSnapshot> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{SNAPSHOT_PREFIX}{timestamp}.json");

        let mut history = self.history.lock().unwrap();
        history.push((filename.clone(), snapshot.clone()));

        Ok(PersistedSnapshot {
            snapshot_file: filename,
            latest_file: LATEST_SNAPSHOT_FILE.to_string(),
        })
    }

    async fn load_latest(&self) -> Result<Option<Snapshot>> {
        let history = self.history.lock().unwrap();
        Ok(history.last().map(|(_, snapshot)| snapshot.clone()))
    }
}
