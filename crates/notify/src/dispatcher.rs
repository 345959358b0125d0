use crate::audience::{resolve_audience, Recipient};
use crate::message::{notification_content, notification_payload};
use crate::shared::backoff::backoff_delay;
use crate::shared::usecase::{execute, UseCase};
use futures::stream::{self, StreamExt};
use pirouette_domain::{LedgerEntry, NotificationKind, Workshop};
use pirouette_infra::{IPushService, NotifierContext};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Fans one (workshop, kind) out to its recipients. Every recipient is
/// claimed in the ledger before anything is sent; only the claim winner
/// performs the send, so replays and concurrent dispatchers are harmless.
pub struct DispatchNotificationsUseCase {
    pub workshop: Workshop,
    pub kind: NotificationKind,
    pub recipients: Vec<Recipient>,
    pub push: Arc<dyn IPushService>,
}

impl fmt::Debug for DispatchNotificationsUseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchNotificationsUseCase")
            .field("workshop", &self.workshop.slug)
            .field("kind", &self.kind)
            .field("recipients", &self.recipients.len())
            .finish()
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct DispatchSummary {
    /// Recipients for which this dispatch won the claim
    pub claimed: usize,
    /// Claimed recipients whose send succeeded
    pub sent: usize,
    /// Recipients whose claim or send failed permanently
    pub failed: usize,
}

#[derive(Debug)]
pub enum UseCaseError {}

enum DispatchOutcome {
    AlreadyNotified,
    Sent,
    SendFailed,
    ClaimFailed,
}

#[async_trait::async_trait]
impl UseCase for DispatchNotificationsUseCase {
    type Response = DispatchSummary;

    type Error = UseCaseError;

    const NAME: &'static str = "DispatchNotifications";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let (title, body) = notification_content(&self.workshop, self.kind);
        let payload = notification_payload(&self.workshop, self.kind);
        let now = ctx.sys.get_timestamp_millis();

        let workshop = &self.workshop;
        let kind = self.kind;
        let push = &self.push;
        let outcomes = stream::iter(self.recipients.clone())
            .map(|recipient| {
                let entry = LedgerEntry::new(
                    recipient.user_id.clone(),
                    workshop,
                    kind,
                    title.clone(),
                    body.clone(),
                    now,
                );
                let payload = payload.clone();
                async move { dispatch_one(entry, recipient, payload, push.as_ref(), ctx).await }
            })
            .buffer_unordered(ctx.config.dispatch_workers.max(1))
            .collect::<Vec<_>>()
            .await;

        let mut summary = DispatchSummary::default();
        for outcome in outcomes {
            match outcome {
                DispatchOutcome::AlreadyNotified => {}
                DispatchOutcome::Sent => {
                    summary.claimed += 1;
                    summary.sent += 1;
                }
                DispatchOutcome::SendFailed => {
                    summary.claimed += 1;
                    summary.failed += 1;
                }
                DispatchOutcome::ClaimFailed => {
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }
}

async fn dispatch_one(
    entry: LedgerEntry,
    recipient: Recipient,
    payload: Value,
    push: &dyn IPushService,
    ctx: &NotifierContext,
) -> DispatchOutcome {
    let claimed = match claim_with_backoff(&entry, ctx).await {
        Ok(claimed) => claimed,
        Err(e) => {
            error!(
                "Unable to claim ledger entry for user {} and workshop {}: {:?}",
                entry.user_id, entry.workshop_slug, e
            );
            return DispatchOutcome::ClaimFailed;
        }
    };
    if !claimed {
        return DispatchOutcome::AlreadyNotified;
    }

    // The claim is not released on failure: the entry already records this
    // (user, workshop, kind) as notified, which keeps the at-most-once
    // guarantee even when the transport misbehaves.
    match send_with_backoff(push, &recipient.address, &entry, &payload, ctx).await {
        Ok(()) => DispatchOutcome::Sent,
        Err(e) => {
            error!(
                "Push send to user {} for workshop {} failed permanently: {:?}",
                entry.user_id, entry.workshop_slug, e
            );
            DispatchOutcome::SendFailed
        }
    }
}

// A record-store blip must not drop the notification on the floor: the
// observer checkpoints past the event afterwards, so there is no redelivery
// to fall back on.
async fn claim_with_backoff(entry: &LedgerEntry, ctx: &NotifierContext) -> anyhow::Result<bool> {
    let mut attempt: u32 = 0;
    loop {
        match ctx.repos.ledger.try_claim(entry).await {
            Ok(claimed) => return Ok(claimed),
            Err(e) => {
                attempt += 1;
                if attempt >= ctx.config.backoff.max_attempts {
                    return Err(e);
                }
                let delay = backoff_delay(&ctx.config.backoff, attempt - 1);
                warn!(
                    "Ledger claim for workshop {} failed, retrying in {:?} (attempt {}/{}): {:?}",
                    entry.workshop_slug, delay, attempt, ctx.config.backoff.max_attempts, e
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn send_with_backoff(
    push: &dyn IPushService,
    address: &str,
    entry: &LedgerEntry,
    payload: &Value,
    ctx: &NotifierContext,
) -> anyhow::Result<()> {
    let timeout = Duration::from_millis(ctx.config.send_timeout_millis);
    let mut attempt: u32 = 0;
    loop {
        let res = tokio::time::timeout(
            timeout,
            push.send(address, &entry.title, &entry.body, payload),
        )
        .await
        .unwrap_or_else(|_| Err(anyhow::anyhow!("Push send timed out")));

        match res {
            Ok(()) => return Ok(()),
            Err(e) => {
                attempt += 1;
                if attempt >= ctx.config.backoff.max_attempts {
                    return Err(e);
                }
                let delay = backoff_delay(&ctx.config.backoff, attempt - 1);
                warn!(
                    "Push send to workshop {} recipient failed, retrying in {:?} (attempt {}/{}): {:?}",
                    entry.workshop_slug, delay, attempt, ctx.config.backoff.max_attempts, e
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Resolves the audience for `workshop` and dispatches `kind` to it. Shared
/// entry point for the change observer and the reminder sweep.
pub(crate) async fn notify_workshop(
    workshop: Workshop,
    kind: NotificationKind,
    ctx: &NotifierContext,
    push: &Arc<dyn IPushService>,
) {
    let recipients = match resolve_audience(&workshop.organizer_ids, ctx).await {
        Ok(recipients) => recipients,
        Err(e) => {
            error!(
                "Unable to resolve audience for workshop {}: {:?}",
                workshop.slug, e
            );
            return;
        }
    };
    if recipients.is_empty() {
        return;
    }

    let usecase = DispatchNotificationsUseCase {
        workshop,
        kind,
        recipients,
        push: push.clone(),
    };
    let _ = execute(usecase, ctx).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pirouette_domain::ID;
    use pirouette_infra::{DeleteResult, ILedgerRepo, InMemoryPushService};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Ledger whose first `failures` claim calls error out, then behaves
    /// like the in-memory ledger.
    struct FlakyLedgerRepo {
        failures_left: AtomicUsize,
        entries: Mutex<Vec<LedgerEntry>>,
    }

    impl FlakyLedgerRepo {
        fn new(failures: usize) -> Self {
            Self {
                failures_left: AtomicUsize::new(failures),
                entries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ILedgerRepo for FlakyLedgerRepo {
        async fn try_claim(&self, entry: &LedgerEntry) -> anyhow::Result<bool> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                anyhow::bail!("Ledger unavailable");
            }
            let mut entries = self.entries.lock().unwrap();
            let exists = entries.iter().any(|e| {
                e.user_id == entry.user_id
                    && e.workshop_slug == entry.workshop_slug
                    && e.kind == entry.kind
            });
            if exists {
                return Ok(false);
            }
            entries.push(entry.clone());
            Ok(true)
        }

        async fn find_by_user(&self, user_id: &ID) -> Vec<LedgerEntry> {
            let entries = self.entries.lock().unwrap();
            entries
                .iter()
                .filter(|e| e.user_id == *user_id)
                .cloned()
                .collect()
        }

        async fn delete_created_before(
            &self,
            horizon_millis: i64,
            protected_slugs: &[String],
        ) -> anyhow::Result<DeleteResult> {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.len();
            entries.retain(|e| {
                e.created_at >= horizon_millis || protected_slugs.contains(&e.workshop_slug)
            });
            Ok(DeleteResult {
                deleted_count: (before - entries.len()) as i64,
            })
        }
    }

    fn workshop_factory() -> Workshop {
        Workshop {
            id: Default::default(),
            slug: "west-coast-swing-beginners".into(),
            title: "West Coast Swing Beginners".into(),
            organizer_ids: vec![Default::default()],
            sessions: Vec::new(),
            prices: Vec::new(),
            available: true,
            created: 0,
            updated: 0,
        }
    }

    fn test_context() -> NotifierContext {
        let mut ctx = NotifierContext::create_inmemory();
        ctx.config.send_timeout_millis = 100;
        ctx.config.backoff.initial_millis = 1;
        ctx.config.backoff.max_attempts = 3;
        ctx
    }

    fn recipient_factory(address: &str) -> Recipient {
        Recipient {
            user_id: ID::default(),
            address: address.into(),
        }
    }

    #[tokio::test]
    async fn sends_once_per_recipient_and_absorbs_replays() {
        let ctx = test_context();
        let push = Arc::new(InMemoryPushService::new());
        let workshop = workshop_factory();
        let recipients = vec![recipient_factory("token-a"), recipient_factory("token-b")];

        let mut usecase = DispatchNotificationsUseCase {
            workshop: workshop.clone(),
            kind: NotificationKind::NewWorkshop,
            recipients: recipients.clone(),
            push: push.clone(),
        };
        let summary = usecase.execute(&ctx).await.unwrap();
        assert_eq!(summary.claimed, 2);
        assert_eq!(summary.sent, 2);
        assert_eq!(summary.failed, 0);

        // Replaying the exact same dispatch claims nothing and sends nothing
        let mut replay = DispatchNotificationsUseCase {
            workshop,
            kind: NotificationKind::NewWorkshop,
            recipients,
            push: push.clone(),
        };
        let summary = replay.execute(&ctx).await.unwrap();
        assert_eq!(summary, DispatchSummary::default());

        assert_eq!(push.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn one_failing_recipient_does_not_block_the_rest() {
        let ctx = test_context();
        let push = Arc::new(InMemoryPushService::new());
        push.fail_address("token-broken");
        let workshop = workshop_factory();

        let healthy = recipient_factory("token-ok");
        let broken = recipient_factory("token-broken");

        let mut usecase = DispatchNotificationsUseCase {
            workshop,
            kind: NotificationKind::PriceDrop,
            recipients: vec![broken.clone(), healthy.clone()],
            push: push.clone(),
        };
        let summary = usecase.execute(&ctx).await.unwrap();
        assert_eq!(summary.claimed, 2);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 1);

        assert_eq!(push.sent_to("token-ok").len(), 1);
        assert!(push.sent_to("token-broken").is_empty());

        // Failed send keeps the claim: the broken recipient is still
        // recorded as notified and never retried by a later dispatch
        assert_eq!(ctx.repos.ledger.find_by_user(&broken.user_id).await.len(), 1);
        let mut replay = DispatchNotificationsUseCase {
            workshop: workshop_factory(),
            kind: NotificationKind::PriceDrop,
            recipients: vec![broken],
            push: push.clone(),
        };
        let summary = replay.execute(&ctx).await.unwrap();
        assert_eq!(summary, DispatchSummary::default());
    }

    #[tokio::test]
    async fn transient_claim_error_is_retried() {
        let mut ctx = test_context();
        let ledger = Arc::new(FlakyLedgerRepo::new(1));
        ctx.repos.ledger = ledger.clone();
        let push = Arc::new(InMemoryPushService::new());
        let recipient = recipient_factory("token-a");

        let mut usecase = DispatchNotificationsUseCase {
            workshop: workshop_factory(),
            kind: NotificationKind::NewWorkshop,
            recipients: vec![recipient.clone()],
            push: push.clone(),
        };
        let summary = usecase.execute(&ctx).await.unwrap();
        assert_eq!(summary.claimed, 1);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(ledger.find_by_user(&recipient.user_id).await.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_claim_counts_as_failure_and_sends_nothing() {
        let mut ctx = test_context();
        ctx.repos.ledger = Arc::new(FlakyLedgerRepo::new(100));
        let push = Arc::new(InMemoryPushService::new());

        let mut usecase = DispatchNotificationsUseCase {
            workshop: workshop_factory(),
            kind: NotificationKind::NewWorkshop,
            recipients: vec![recipient_factory("token-a")],
            push: push.clone(),
        };
        let summary = usecase.execute(&ctx).await.unwrap();
        assert_eq!(summary.claimed, 0);
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.failed, 1);
        assert!(push.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn distinct_kinds_are_separate_claims() {
        let ctx = test_context();
        let push = Arc::new(InMemoryPushService::new());
        let workshop = workshop_factory();
        let recipient = recipient_factory("token-a");

        for kind in &[NotificationKind::NewWorkshop, NotificationKind::Reminder24h] {
            let mut usecase = DispatchNotificationsUseCase {
                workshop: workshop.clone(),
                kind: *kind,
                recipients: vec![recipient.clone()],
                push: push.clone(),
            };
            let summary = usecase.execute(&ctx).await.unwrap();
            assert_eq!(summary.sent, 1);
        }

        assert_eq!(push.sent_to("token-a").len(), 2);
        assert_eq!(ctx.repos.ledger.find_by_user(&recipient.user_id).await.len(), 2);
    }
}
