use async_trait::async_trait;

use crate::Result;

/// Source of batch ids awaiting processing.
///
/// Delivery is at-least-once with one opaque id per message; the consumer
/// does not deduplicate, so a redelivered id re-runs the whole pipeline.
#[async_trait]
pub trait UploadQueue: Send + Sync {
    /// Wait for the next batch id. `None` means no message arrived within
    /// the poll window; callers loop.
    async fn next(&mut self) -> Result<Option<String>>;
}
