use super::ILedgerRepo;
use crate::repos::shared::repo::DeleteResult;

use pirouette_domain::{LedgerEntry, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;

pub struct PostgresLedgerRepo {
    pool: PgPool,
}

impl PostgresLedgerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LedgerEntryRaw {
    user_uid: Uuid,
    workshop_slug: String,
    organizer_uid: Uuid,
    kind: String,
    title: String,
    body: String,
    is_sent: bool,
    sent_at: i64,
    created_at: i64,
}

impl TryFrom<LedgerEntryRaw> for LedgerEntry {
    type Error = anyhow::Error;

    fn try_from(raw: LedgerEntryRaw) -> anyhow::Result<Self> {
        Ok(Self {
            user_id: ID::from(raw.user_uid),
            workshop_slug: raw.workshop_slug,
            organizer_id: ID::from(raw.organizer_uid),
            kind: raw.kind.parse()?,
            title: raw.title,
            body: raw.body,
            is_sent: raw.is_sent,
            sent_at: raw.sent_at,
            created_at: raw.created_at,
        })
    }
}

#[async_trait::async_trait]
impl ILedgerRepo for PostgresLedgerRepo {
    async fn try_claim(&self, entry: &LedgerEntry) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO notification_ledger
            (user_uid, workshop_slug, organizer_uid, kind, title, body, is_sent, sent_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT ON CONSTRAINT notification_ledger_once DO NOTHING
            "#,
        )
        .bind(*entry.user_id.inner_ref())
        .bind(&entry.workshop_slug)
        .bind(*entry.organizer_id.inner_ref())
        .bind(entry.kind.as_str())
        .bind(&entry.title)
        .bind(&entry.body)
        .bind(entry.is_sent)
        .bind(entry.sent_at)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<LedgerEntry> {
        sqlx::query_as::<_, LedgerEntryRaw>(
            r#"
            SELECT * FROM notification_ledger
            WHERE user_uid = $1
            "#,
        )
        .bind(*user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .filter_map(|raw| LedgerEntry::try_from(raw).ok())
        .collect()
    }

    async fn delete_created_before(
        &self,
        horizon_millis: i64,
        protected_slugs: &[String],
    ) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM notification_ledger
            WHERE created_at < $1 AND NOT (workshop_slug = ANY($2))
            "#,
        )
        .bind(horizon_millis)
        .bind(protected_slugs)
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }
}
