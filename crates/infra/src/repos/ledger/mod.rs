mod inmemory;
mod postgres;

pub use inmemory::InMemoryLedgerRepo;
pub use postgres::PostgresLedgerRepo;

use crate::repos::shared::repo::DeleteResult;
use pirouette_domain::{LedgerEntry, ID};

#[async_trait::async_trait]
pub trait ILedgerRepo: Send + Sync {
    /// Attempts to insert `entry`. Returns `true` iff no entry existed for
    /// the same (user, workshop_slug, kind), in which case the caller is the
    /// unique authority to perform the send. This is the only
    /// synchronization primitive in the notification engine.
    async fn try_claim(&self, entry: &LedgerEntry) -> anyhow::Result<bool>;
    async fn find_by_user(&self, user_id: &ID) -> Vec<LedgerEntry>;
    /// Deletes entries created before `horizon_millis`, except those whose
    /// workshop slug appears in `protected_slugs`.
    async fn delete_created_before(
        &self,
        horizon_millis: i64,
        protected_slugs: &[String],
    ) -> anyhow::Result<DeleteResult>;
}
