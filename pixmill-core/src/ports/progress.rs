use async_trait::async_trait;
use pixmill_model::{BatchId, BatchStatus};

use crate::Result;

/// Transient progress publication for a running batch.
///
/// Values are advisory: polling clients read them while the batch runs, and
/// the key disappears once the durable record says `completed`.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn set(&self, id: BatchId, status: BatchStatus, progress: f64) -> Result<()>;

    async fn clear(&self, id: BatchId) -> Result<()>;
}

/// Fire-and-forget hand-off of a finished batch to webhook delivery.
///
/// No delivery acknowledgment flows back to the publisher; the listener owns
/// everything after the publish.
#[async_trait]
pub trait WebhookChannel: Send + Sync {
    async fn publish(&self, id: BatchId, url: &str) -> Result<()>;
}
