mod inmemory;
mod postgres;

pub use inmemory::InMemorySubscriptionRepo;
pub use postgres::PostgresSubscriptionRepo;

use pirouette_domain::{Subscription, ID};

/// Read model over the user-preferences subsystem's subscription data. The
/// engine never mutates subscriptions; `insert` exists for tests and for the
/// owning subsystem's writer.
#[async_trait::async_trait]
pub trait ISubscriptionRepo: Send + Sync {
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()>;
    async fn find_by_organizers(&self, organizer_ids: &[ID]) -> anyhow::Result<Vec<Subscription>>;
}
