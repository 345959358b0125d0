use super::ICheckpointRepo;

use pirouette_domain::StreamCheckpoint;
use sqlx::{FromRow, PgPool};

pub struct PostgresCheckpointRepo {
    pool: PgPool,
}

impl PostgresCheckpointRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StreamCheckpointRaw {
    name: String,
    token: String,
    updated: i64,
}

impl From<StreamCheckpointRaw> for StreamCheckpoint {
    fn from(raw: StreamCheckpointRaw) -> Self {
        Self {
            name: raw.name,
            token: raw.token,
            updated: raw.updated,
        }
    }
}

#[async_trait::async_trait]
impl ICheckpointRepo for PostgresCheckpointRepo {
    async fn find(&self, name: &str) -> anyhow::Result<Option<StreamCheckpoint>> {
        let raw = sqlx::query_as::<_, StreamCheckpointRaw>(
            r#"
            SELECT * FROM stream_checkpoints
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(raw.map(|raw| raw.into()))
    }

    async fn save(&self, checkpoint: &StreamCheckpoint) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stream_checkpoints (name, token, updated)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET token = $2, updated = $3
            "#,
        )
        .bind(&checkpoint.name)
        .bind(&checkpoint.token)
        .bind(checkpoint.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM stream_checkpoints
            WHERE name = $1
            "#,
        )
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
