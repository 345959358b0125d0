mod inmemory;
mod postgres;

pub use inmemory::InMemoryWorkshopRepo;
pub use postgres::PostgresWorkshopRepo;

use pirouette_domain::Workshop;

/// Read model over the workshop collection. The collection is written by
/// the external ingestion pipeline, which deletes and re-creates rows every
/// few hours; `insert`/`save`/`delete_by_slug` exist for that writer and for
/// tests.
#[async_trait::async_trait]
pub trait IWorkshopRepo: Send + Sync {
    async fn insert(&self, workshop: &Workshop) -> anyhow::Result<()>;
    /// Insert-or-replace keyed by slug.
    async fn save(&self, workshop: &Workshop) -> anyhow::Result<()>;
    async fn find_by_slug(&self, slug: &str) -> Option<Workshop>;
    async fn find_all(&self) -> anyhow::Result<Vec<Workshop>>;
    /// Workshops whose nearest session start at or after `now_millis` falls
    /// within `[from_millis, to_millis)`.
    async fn find_with_next_session_in(
        &self,
        now_millis: i64,
        from_millis: i64,
        to_millis: i64,
    ) -> anyhow::Result<Vec<Workshop>>;
    async fn delete_by_slug(&self, slug: &str) -> anyhow::Result<()>;
}
