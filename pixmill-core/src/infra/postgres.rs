use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use pixmill_model::{Batch, BatchId, BatchStatus};

use crate::error::{PipelineError, Result};
use crate::ports::BatchRepository;

#[derive(Clone, Debug)]
pub struct PostgresBatchRepository {
    pool: PgPool,
}

impl PostgresBatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BatchRow {
    id: Uuid,
    original_file_name: String,
    file_name: String,
    status: String,
    progress: f64,
    webhook_url: Option<String>,
    webhook_response: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BatchRow {
    fn into_batch(self) -> Result<Batch> {
        let status = BatchStatus::parse(&self.status).ok_or_else(|| {
            PipelineError::Internal(format!("unknown batch status: {}", self.status))
        })?;

        Ok(Batch {
            id: BatchId(self.id),
            original_file_name: self.original_file_name,
            file_name: self.file_name,
            status,
            progress: self.progress,
            webhook_url: self.webhook_url,
            webhook_response: self.webhook_response,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl BatchRepository for PostgresBatchRepository {
    async fn get(&self, id: BatchId) -> Result<Option<Batch>> {
        let row = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, original_file_name, file_name, status, progress,
                   webhook_url, webhook_response, created_at, updated_at
            FROM batches
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(BatchRow::into_batch).transpose()
    }

    async fn mark_completed(&self, id: BatchId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE batches
            SET status = $1, progress = 100, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(BatchStatus::Completed.as_str())
        .bind(id.to_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_webhook_response(&self, id: BatchId, response: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE batches
            SET webhook_response = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(response)
        .bind(id.to_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
