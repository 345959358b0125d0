use super::{IWorkshopStream, SubscribeError};

use futures::stream::{self, BoxStream};
use pirouette_domain::WorkshopChange;
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Channel-backed stream for tests. Events pushed with `push` are delivered
/// to the single subscriber; tokens registered with `mark_stale` make a
/// resume attempt fail like an expired history would.
pub struct InMemoryWorkshopStream {
    tx: UnboundedSender<WorkshopChange>,
    rx: Mutex<Option<UnboundedReceiver<WorkshopChange>>>,
    stale_tokens: Mutex<HashSet<String>>,
}

impl InMemoryWorkshopStream {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            stale_tokens: Mutex::new(HashSet::new()),
        }
    }

    pub fn push(&self, change: WorkshopChange) {
        let _ = self.tx.send(change);
    }

    pub fn mark_stale(&self, token: &str) {
        self.stale_tokens.lock().unwrap().insert(token.to_string());
    }
}

#[async_trait::async_trait]
impl IWorkshopStream for InMemoryWorkshopStream {
    async fn subscribe(
        &self,
        from: Option<String>,
    ) -> Result<BoxStream<'static, WorkshopChange>, SubscribeError> {
        if let Some(token) = from {
            if self.stale_tokens.lock().unwrap().contains(&token) {
                return Err(SubscribeError::StaleCheckpoint);
            }
        }

        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow::anyhow!("Stream already subscribed"))?;

        Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|change| (change, rx))
        })))
    }
}
