use async_trait::async_trait;
use pixmill_model::{Batch, BatchId};

use crate::Result;

/// Repository port for batch job records.
///
/// The store holds one collection of batches keyed by id; this system reads
/// a record once per run and applies partial-field updates. Record creation
/// belongs to the upstream submission flow.
#[async_trait]
pub trait BatchRepository: Send + Sync {
    async fn get(&self, id: BatchId) -> Result<Option<Batch>>;

    /// Finalize a batch: status `completed`, progress 100, fresh timestamp.
    async fn mark_completed(&self, id: BatchId) -> Result<()>;

    /// Record the webhook delivery outcome string.
    async fn set_webhook_response(&self, id: BatchId, response: &str) -> Result<()>;
}
