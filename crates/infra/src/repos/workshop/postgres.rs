use super::IWorkshopRepo;

use pirouette_domain::{PriceTier, SessionSlot, Workshop, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};

pub struct PostgresWorkshopRepo {
    pool: PgPool,
}

impl PostgresWorkshopRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct WorkshopRaw {
    workshop_uid: Uuid,
    slug: String,
    title: String,
    organizer_uids: Vec<Uuid>,
    sessions: Json<Vec<SessionSlot>>,
    prices: Json<Vec<PriceTier>>,
    available: bool,
    created: i64,
    updated: i64,
}

impl From<WorkshopRaw> for Workshop {
    fn from(raw: WorkshopRaw) -> Self {
        Self {
            id: ID::from(raw.workshop_uid),
            slug: raw.slug,
            title: raw.title,
            organizer_ids: raw.organizer_uids.into_iter().map(ID::from).collect(),
            sessions: raw.sessions.0,
            prices: raw.prices.0,
            available: raw.available,
            created: raw.created,
            updated: raw.updated,
        }
    }
}

// session_starts is a derived bigint[] column so that the reminder window
// query can run in the database instead of scanning every row in Rust.
fn session_starts(workshop: &Workshop) -> Vec<i64> {
    workshop
        .sessions
        .iter()
        .filter_map(|s| s.start_ts_millis())
        .collect()
}

fn organizer_uids(workshop: &Workshop) -> Vec<Uuid> {
    workshop
        .organizer_ids
        .iter()
        .map(|id| *id.inner_ref())
        .collect()
}

#[async_trait::async_trait]
impl IWorkshopRepo for PostgresWorkshopRepo {
    async fn insert(&self, workshop: &Workshop) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workshops
            (workshop_uid, slug, title, organizer_uids, sessions, prices, session_starts, available, created, updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(*workshop.id.inner_ref())
        .bind(&workshop.slug)
        .bind(&workshop.title)
        .bind(organizer_uids(workshop))
        .bind(Json(&workshop.sessions))
        .bind(Json(&workshop.prices))
        .bind(session_starts(workshop))
        .bind(workshop.available)
        .bind(workshop.created)
        .bind(workshop.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, workshop: &Workshop) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workshops
            (workshop_uid, slug, title, organizer_uids, sessions, prices, session_starts, available, created, updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (slug) DO UPDATE SET
                workshop_uid = $1,
                title = $3,
                organizer_uids = $4,
                sessions = $5,
                prices = $6,
                session_starts = $7,
                available = $8,
                updated = $10
            "#,
        )
        .bind(*workshop.id.inner_ref())
        .bind(&workshop.slug)
        .bind(&workshop.title)
        .bind(organizer_uids(workshop))
        .bind(Json(&workshop.sessions))
        .bind(Json(&workshop.prices))
        .bind(session_starts(workshop))
        .bind(workshop.available)
        .bind(workshop.created)
        .bind(workshop.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_slug(&self, slug: &str) -> Option<Workshop> {
        sqlx::query_as::<_, WorkshopRaw>(
            r#"
            SELECT * FROM workshops
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|raw| raw.into())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Workshop>> {
        let workshops = sqlx::query_as::<_, WorkshopRaw>(
            r#"
            SELECT * FROM workshops
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(workshops.into_iter().map(|raw| raw.into()).collect())
    }

    async fn find_with_next_session_in(
        &self,
        now_millis: i64,
        from_millis: i64,
        to_millis: i64,
    ) -> anyhow::Result<Vec<Workshop>> {
        let workshops = sqlx::query_as::<_, WorkshopRaw>(
            r#"
            SELECT * FROM workshops w
            WHERE COALESCE(
                (SELECT MIN(s) FROM unnest(w.session_starts) AS s WHERE s >= $1),
                -1
            ) >= $2
            AND (SELECT MIN(s) FROM unnest(w.session_starts) AS s WHERE s >= $1) < $3
            "#,
        )
        .bind(now_millis)
        .bind(from_millis)
        .bind(to_millis)
        .fetch_all(&self.pool)
        .await?;

        Ok(workshops.into_iter().map(|raw| raw.into()).collect())
    }

    async fn delete_by_slug(&self, slug: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM workshops
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
