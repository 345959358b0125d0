use super::ISubscriptionRepo;

use pirouette_domain::{Subscription, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresSubscriptionRepo {
    pool: PgPool,
}

impl PostgresSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SubscriptionRaw {
    user_uid: Uuid,
    organizer_uid: Uuid,
    enabled: bool,
    device_token: String,
}

impl From<SubscriptionRaw> for Subscription {
    fn from(raw: SubscriptionRaw) -> Self {
        Self {
            user_id: ID::from(raw.user_uid),
            organizer_id: ID::from(raw.organizer_uid),
            enabled: raw.enabled,
            device_token: raw.device_token,
        }
    }
}

#[async_trait::async_trait]
impl ISubscriptionRepo for PostgresSubscriptionRepo {
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workshop_subscriptions
            (user_uid, organizer_uid, enabled, device_token)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(*subscription.user_id.inner_ref())
        .bind(*subscription.organizer_id.inner_ref())
        .bind(subscription.enabled)
        .bind(&subscription.device_token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_organizers(&self, organizer_ids: &[ID]) -> anyhow::Result<Vec<Subscription>> {
        let organizer_uids = organizer_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();

        let subscriptions = sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            SELECT * FROM workshop_subscriptions
            WHERE organizer_uid = ANY($1)
            "#,
        )
        .bind(&organizer_uids)
        .fetch_all(&self.pool)
        .await?;

        Ok(subscriptions.into_iter().map(|raw| raw.into()).collect())
    }
}
