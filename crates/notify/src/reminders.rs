use crate::dispatcher::notify_workshop;
use crate::job_schedulers::current_tick;
use crate::shared::usecase::UseCase;
use pirouette_domain::NotificationKind;
use pirouette_infra::{IPushService, NotifierContext};
use std::sync::Arc;
use tracing::info;

/// Scans for workshops whose first upcoming session starts exactly one lead
/// time from now, within the current scan window, and dispatches a
/// `Reminder24h` to their audiences. Windows are half open on the right so
/// consecutive sweeps tile the timeline without overlap; a session start is
/// picked up by exactly one sweep.
pub struct SendRemindersUseCase {
    pub push: Arc<dyn IPushService>,
}

impl std::fmt::Debug for SendRemindersUseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendRemindersUseCase").finish()
    }
}

#[async_trait::async_trait]
impl UseCase for SendRemindersUseCase {
    type Response = usize;
    type Error = anyhow::Error;

    const NAME: &'static str = "SendReminders";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let period = ctx.config.reminder_scan_window_millis;
        // The window is anchored on the tick boundary, not on `now`:
        // wakeups jitter by a few millis and window edges must still tile
        let from = current_tick(now, period) + ctx.config.reminder_lead_time_millis;
        let to = from + period;

        let upcoming = ctx
            .repos
            .workshops
            .find_with_next_session_in(now, from, to)
            .await?;
        let count = upcoming.len();
        if count > 0 {
            info!("Sending reminders for {} upcoming workshops", count);
        }

        for workshop in upcoming {
            notify_workshop(workshop, NotificationKind::Reminder24h, ctx, &self.push).await;
        }
        Ok(count)
    }
}
