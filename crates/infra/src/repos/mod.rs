mod checkpoint;
mod ledger;
mod shared;
mod subscription;
mod workshop;

pub use checkpoint::ICheckpointRepo;
use checkpoint::{InMemoryCheckpointRepo, PostgresCheckpointRepo};
pub use ledger::ILedgerRepo;
use ledger::{InMemoryLedgerRepo, PostgresLedgerRepo};
pub use shared::repo::DeleteResult;
pub use subscription::ISubscriptionRepo;
use subscription::{InMemorySubscriptionRepo, PostgresSubscriptionRepo};
pub use workshop::IWorkshopRepo;
pub(crate) use workshop::{InMemoryWorkshopRepo, PostgresWorkshopRepo};

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub ledger: Arc<dyn ILedgerRepo>,
    pub checkpoints: Arc<dyn ICheckpointRepo>,
    pub subscriptions: Arc<dyn ISubscriptionRepo>,
    pub workshops: Arc<dyn IWorkshopRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            ledger: Arc::new(PostgresLedgerRepo::new(pool.clone())),
            checkpoints: Arc::new(PostgresCheckpointRepo::new(pool.clone())),
            subscriptions: Arc::new(PostgresSubscriptionRepo::new(pool.clone())),
            workshops: Arc::new(PostgresWorkshopRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            ledger: Arc::new(InMemoryLedgerRepo::new()),
            checkpoints: Arc::new(InMemoryCheckpointRepo::new()),
            subscriptions: Arc::new(InMemorySubscriptionRepo::new()),
            workshops: Arc::new(InMemoryWorkshopRepo::new()),
        }
    }
}
