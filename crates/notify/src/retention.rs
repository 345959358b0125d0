use crate::shared::usecase::UseCase;
use pirouette_infra::{DeleteResult, NotifierContext};
use tracing::info;

/// Purges ledger entries older than the retention horizon. Entries for
/// workshops that still have an upcoming session are kept regardless of age,
/// since dropping them would re-open the reminder claim for a session that
/// was already announced.
#[derive(Debug)]
pub struct PurgeLedgerUseCase;

#[async_trait::async_trait]
impl UseCase for PurgeLedgerUseCase {
    type Response = DeleteResult;
    type Error = anyhow::Error;

    const NAME: &'static str = "PurgeLedger";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let horizon = now - ctx.config.retention_horizon_days * 24 * 60 * 60 * 1000;

        let protected: Vec<String> = ctx
            .repos
            .workshops
            .find_with_next_session_in(now, now, i64::MAX)
            .await?
            .into_iter()
            .map(|w| w.slug)
            .collect();

        let res = ctx
            .repos
            .ledger
            .delete_created_before(horizon, &protected)
            .await?;
        if res.deleted_count > 0 {
            info!("Purged {} expired ledger entries", res.deleted_count);
        }
        Ok(res)
    }
}
