//! Stats source trait

use async_trait::async_trait;
use folio_core::StatsSnapshot;

/// Anything that can produce a fresh statistics snapshot
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Pull a complete snapshot. May take many seconds for live sources.
    async fn pull(&self) -> anyhow::Result<StatsSnapshot>;

    /// Short label used in log lines
    fn name(&self) -> &str;
}
