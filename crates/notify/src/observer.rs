use crate::classifier::classify;
use crate::dispatcher::notify_workshop;
use crate::shared::backoff::backoff_delay;
use futures::StreamExt;
use pirouette_domain::{ChangeOp, NotificationKind, StreamCheckpoint, WorkshopChange};
use pirouette_infra::{IPushService, IWorkshopStream, NotifierContext, SubscribeError};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Drives the workshop mutation stream until the process stops: resumes
/// from the persisted checkpoint, classifies and dispatches each event, and
/// reconnects with capped exponential backoff. A resume token rejected as
/// expired triggers a full reconciliation pass instead of a crash.
pub async fn run_workshop_observer(
    ctx: NotifierContext,
    stream: Arc<dyn IWorkshopStream>,
    push: Arc<dyn IPushService>,
) {
    let mut attempt: u32 = 0;
    loop {
        let from = match ctx.repos.checkpoints.find(StreamCheckpoint::OBSERVER).await {
            Ok(checkpoint) => checkpoint.map(|c| c.token),
            Err(e) => {
                error!("Unable to read stream checkpoint: {:?}", e);
                None
            }
        };

        match stream.subscribe(from).await {
            Ok(mut changes) => {
                info!("Workshop change stream connected");
                attempt = 0;
                while let Some(change) = changes.next().await {
                    let token = change.token.clone();
                    handle_change(change, &ctx, &push).await;

                    // The checkpoint moves only after the event's downstream
                    // effects are durable; re-processing after a crash is
                    // absorbed by the ledger claim.
                    let checkpoint = StreamCheckpoint::new(
                        StreamCheckpoint::OBSERVER,
                        token,
                        ctx.sys.get_timestamp_millis(),
                    );
                    if let Err(e) = ctx.repos.checkpoints.save(&checkpoint).await {
                        error!("Unable to persist stream checkpoint: {:?}", e);
                    }
                }
                warn!("Workshop change stream ended, reconnecting");
            }
            Err(SubscribeError::StaleCheckpoint) => {
                warn!("Stream checkpoint expired, running full reconciliation");
                if let Err(e) = reconcile(&ctx, &push).await {
                    error!("Workshop reconciliation failed: {:?}", e);
                }
            }
            Err(SubscribeError::Connection(e)) => {
                error!("Unable to connect to workshop change stream: {:?}", e);
            }
        }

        let delay = backoff_delay(&ctx.config.backoff, attempt);
        attempt = attempt.saturating_add(1);
        tokio::time::sleep(delay).await;
    }
}

/// Routes one mutation-stream event. Inserts are always `NewWorkshop`;
/// updates go through the significance classifier; deletes are the expected
/// noise of the ingestion pipeline dropping the collection before
/// re-populating it.
pub(crate) async fn handle_change(
    change: WorkshopChange,
    ctx: &NotifierContext,
    push: &Arc<dyn IPushService>,
) {
    match change.op {
        ChangeOp::Insert => match change.after {
            Some(after) => notify_workshop(after, NotificationKind::NewWorkshop, ctx, push).await,
            None => warn!("Insert event without an after image, skipping"),
        },
        ChangeOp::Update | ChangeOp::Replace => match (change.before, change.after) {
            (Some(before), Some(after)) => {
                if let Some(kind) = classify(&before, &after) {
                    notify_workshop(after, kind, ctx, push).await;
                }
            }
            _ => warn!("Update event without both images, skipping"),
        },
        ChangeOp::Delete => {}
    }
}

/// Recovery path for an expired checkpoint: replay the full current
/// workshop set as inserts. Already-notified users are filtered by the
/// ledger claim, so only genuinely missed workshops produce sends. The
/// checkpoint is dropped afterwards so the next subscribe starts fresh.
async fn reconcile(ctx: &NotifierContext, push: &Arc<dyn IPushService>) -> anyhow::Result<()> {
    let workshops = ctx.repos.workshops.find_all().await?;
    info!("Reconciling {} workshops", workshops.len());
    for workshop in workshops {
        notify_workshop(workshop, NotificationKind::NewWorkshop, ctx, push).await;
    }
    ctx.repos.checkpoints.delete(StreamCheckpoint::OBSERVER).await?;
    Ok(())
}
