mod inmemory;
mod postgres;

pub use inmemory::InMemoryCheckpointRepo;
pub use postgres::PostgresCheckpointRepo;

use pirouette_domain::StreamCheckpoint;

#[async_trait::async_trait]
pub trait ICheckpointRepo: Send + Sync {
    async fn find(&self, name: &str) -> anyhow::Result<Option<StreamCheckpoint>>;
    /// Insert-or-update keyed by checkpoint name.
    async fn save(&self, checkpoint: &StreamCheckpoint) -> anyhow::Result<()>;
    async fn delete(&self, name: &str) -> anyhow::Result<()>;
}
