use super::{IWorkshopStream, SubscribeError};
use crate::repos::IWorkshopRepo;

use futures::stream::{self, BoxStream};
use pirouette_domain::{ChangeOp, Workshop, WorkshopChange};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::warn;

/// Change feed adapter for stores without a native mutation stream: polls
/// the workshop collection and diffs consecutive snapshots into
/// insert/update/delete events, keyed by slug.
///
/// Tokens are synthetic and a fresh subscription always rebaselines, so the
/// first poll after a restart re-emits the whole collection as inserts.
/// Downstream that replay is absorbed by the ledger claim.
pub struct PollingWorkshopStream {
    workshops: Arc<dyn IWorkshopRepo>,
    period: Duration,
}

impl PollingWorkshopStream {
    pub fn new(workshops: Arc<dyn IWorkshopRepo>, period: Duration) -> Self {
        Self { workshops, period }
    }
}

fn emit(
    tx: &UnboundedSender<WorkshopChange>,
    seq: &mut u64,
    op: ChangeOp,
    before: Option<Workshop>,
    after: Option<Workshop>,
) -> bool {
    *seq += 1;
    tx.send(WorkshopChange {
        op,
        before,
        after,
        token: format!("poll-{}", seq),
    })
    .is_ok()
}

async fn poll_loop(
    workshops: Arc<dyn IWorkshopRepo>,
    period: Duration,
    tx: UnboundedSender<WorkshopChange>,
) {
    let mut snapshot: HashMap<String, Workshop> = HashMap::new();
    let mut seq: u64 = 0;
    let mut tick = tokio::time::interval(period);

    loop {
        tick.tick().await;

        let current = match workshops.find_all().await {
            Ok(current) => current,
            Err(e) => {
                warn!("Unable to poll workshops for changes: {:?}", e);
                continue;
            }
        };

        let next: HashMap<String, Workshop> = current
            .into_iter()
            .map(|w| (w.slug.clone(), w))
            .collect();

        for (slug, after) in &next {
            let alive = match snapshot.remove(slug) {
                None => emit(&tx, &mut seq, ChangeOp::Insert, None, Some(after.clone())),
                Some(before) if before != *after => emit(
                    &tx,
                    &mut seq,
                    ChangeOp::Update,
                    Some(before),
                    Some(after.clone()),
                ),
                Some(_) => true,
            };
            if !alive {
                return;
            }
        }
        for (_slug, before) in snapshot.drain() {
            if !emit(&tx, &mut seq, ChangeOp::Delete, Some(before), None) {
                return;
            }
        }

        snapshot = next;
    }
}

#[async_trait::async_trait]
impl IWorkshopStream for PollingWorkshopStream {
    async fn subscribe(
        &self,
        _from: Option<String>,
    ) -> Result<BoxStream<'static, WorkshopChange>, SubscribeError> {
        let (tx, rx) = unbounded_channel();
        tokio::spawn(poll_loop(self.workshops.clone(), self.period, tx));

        Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|change| (change, rx))
        })))
    }
}
