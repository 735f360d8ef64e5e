//! # Pixmill Worker
//!
//! Queue consumer daemon: drains batch ids one at a time and drives each
//! through the processing pipeline.
//!
//! Only startup failures (missing configuration, unreachable dependencies)
//! terminate the process. Once consuming, every per-run error is logged and
//! swallowed so the loop never stops; an abandoned run leaves its batch
//! record stalled at the last reported progress.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pixmill_core::config::PipelineConfig;
use pixmill_core::infra::postgres::PostgresBatchRepository;
use pixmill_core::infra::redis::{RedisStore, RedisUploadQueue};
use pixmill_core::pipeline::BatchOrchestrator;
use pixmill_core::ports::UploadQueue;
use pixmill_model::BatchId;
use pixmill_worker::{config::Config, storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to connect to postgres")?;
    pixmill_core::MIGRATOR
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let redis = RedisStore::connect(&config.redis_url).await?;
    let mut queue = RedisUploadQueue::connect(&config.redis_url, &config.queue_key).await?;

    let bucket = Arc::new(storage::build(&config.storage)?);

    let orchestrator = BatchOrchestrator::new(
        Arc::new(PostgresBatchRepository::new(pool)),
        bucket,
        Arc::new(redis.clone()),
        Arc::new(redis),
        PipelineConfig::default().with_worker_count(config.worker_count),
    );

    info!("Image processor started");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
            next = queue.next() => match next {
                Ok(Some(raw_id)) => consume(&orchestrator, &raw_id).await,
                Ok(None) => {} // poll window elapsed, keep waiting
                Err(e) => {
                    error!("Queue receive failed: {e}");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            },
        }
    }

    Ok(())
}

/// Handle one delivery: parse the id, run the batch, log the outcome.
/// Nothing propagates; the consumer loop must outlive any single batch, and
/// the message counts as consumed either way.
async fn consume(orchestrator: &BatchOrchestrator, raw_id: &str) {
    let id: BatchId = match raw_id.trim().parse() {
        Ok(id) => id,
        Err(_) => {
            warn!("Discarding malformed batch id: {raw_id}");
            return;
        }
    };

    if let Err(e) = orchestrator.run(id).await {
        error!("Batch {} abandoned: {}", id, e);
    }
}
