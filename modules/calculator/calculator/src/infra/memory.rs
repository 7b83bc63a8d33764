//! In-memory history store.

use async_trait::async_trait;
use calculator_sdk::HistoryEntry;
use parking_lot::RwLock;

use crate::domain::repo::HistoryRepository;

/// History kept in process memory; lost on restart.
#[derive(Default)]
pub struct InMemoryHistory {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl InMemoryHistory {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistory {
    async fn append(&self, entry: HistoryEntry) -> anyhow::Result<()> {
        self.entries.write().push(entry);
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        Ok(self.entries.read().clone())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}
