mod inmemory;
mod polling;

pub use inmemory::InMemoryWorkshopStream;
pub use polling::PollingWorkshopStream;

use futures::stream::BoxStream;
use pirouette_domain::WorkshopChange;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubscribeError {
    /// The resume token points before the start of the retained stream
    /// history. The observer must run a full reconciliation pass instead of
    /// resuming.
    #[error("Stream history no longer contains the given resume token")]
    StaleCheckpoint,
    #[error("Unable to connect to the workshop change stream: {0}")]
    Connection(#[from] anyhow::Error),
}

/// The record store's ordered, resumable workshop mutation feed. Delivery
/// is at-least-once; events for one workshop arrive in mutation order.
#[async_trait::async_trait]
pub trait IWorkshopStream: Send + Sync {
    async fn subscribe(
        &self,
        from: Option<String>,
    ) -> Result<BoxStream<'static, WorkshopChange>, SubscribeError>;
}
