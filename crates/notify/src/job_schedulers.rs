use crate::reminders::SendRemindersUseCase;
use crate::retention::PurgeLedgerUseCase;
use crate::shared::usecase::execute;
use pirouette_infra::{IPushService, NotifierContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Start of the tick window containing `now_ts`, a multiple of
/// `period_millis` on the wall clock. Sweeps anchor their windows here so
/// every process, and every slightly jittered wakeup, scans the same
/// stretch of timeline.
pub fn current_tick(now_ts: i64, period_millis: i64) -> i64 {
    now_ts - now_ts.rem_euclid(period_millis)
}

/// Millis until the next tick boundary.
pub fn millis_to_next_tick(now_ts: i64, period_millis: i64) -> i64 {
    current_tick(now_ts, period_millis) + period_millis - now_ts
}

pub fn start_reminders_job(ctx: NotifierContext, push: Arc<dyn IPushService>) {
    tokio::spawn(async move {
        let period = ctx.config.reminder_scan_window_millis;
        let now = ctx.sys.get_timestamp_millis();
        sleep(Duration::from_millis(millis_to_next_tick(now, period) as u64)).await;

        let mut interval = interval(Duration::from_millis(period as u64));
        loop {
            interval.tick().await;
            let usecase = SendRemindersUseCase { push: push.clone() };
            let _ = execute(usecase, &ctx).await;
        }
    });
}

pub fn start_retention_job(ctx: NotifierContext) {
    tokio::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        sleep(Duration::from_millis(
            millis_to_next_tick(now, DAY_MILLIS) as u64
        ))
        .await;

        let mut interval = interval(Duration::from_millis(DAY_MILLIS as u64));
        loop {
            interval.tick().await;
            let _ = execute(PurgeLedgerUseCase, &ctx).await;
        }
    });
}
