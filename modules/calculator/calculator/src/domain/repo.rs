use async_trait::async_trait;
use calculator_sdk::HistoryEntry;

/// Append-only operation history.
///
/// Implementations must store each entry whole; concurrent appends may
/// interleave but never tear a record.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn append(&self, entry: HistoryEntry) -> anyhow::Result<()>;

    /// All entries in insertion order.
    async fn list(&self) -> anyhow::Result<Vec<HistoryEntry>>;

    async fn clear(&self) -> anyhow::Result<()>;
}
