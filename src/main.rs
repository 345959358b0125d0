mod telemetry;

use pirouette_infra::{
    run_migration, setup_context, IPushService, IWorkshopStream, PollingWorkshopStream,
    RelayPushService,
};
use pirouette_notify::{run_workshop_observer, start_reminders_job, start_retention_job};
use std::sync::Arc;
use std::time::Duration;
use telemetry::{get_subscriber, init_subscriber};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("pirouette".into(), "info".into());
    init_subscriber(subscriber);

    run_migration().await?;
    let context = setup_context().await;

    let push: Arc<dyn IPushService> = Arc::new(RelayPushService::new(
        context.config.push_relay_url.clone(),
        context.config.push_relay_key.clone(),
        Duration::from_millis(context.config.send_timeout_millis as u64),
    )?);
    let stream: Arc<dyn IWorkshopStream> = Arc::new(PollingWorkshopStream::new(
        context.repos.workshops.clone(),
        Duration::from_millis(context.config.stream_poll_period_millis as u64),
    ));

    start_reminders_job(context.clone(), push.clone());
    start_retention_job(context.clone());

    tokio::select! {
        _ = run_workshop_observer(context, stream, push) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }
    Ok(())
}
