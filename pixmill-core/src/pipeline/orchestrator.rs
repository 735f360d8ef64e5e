use std::sync::Arc;

use tracing::{info, warn};

use pixmill_model::{BatchId, BatchStatus};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::pipeline::processor::ImageProcessor;
use crate::pipeline::reshape;
use crate::pipeline::runner::{self, ProgressTracker};
use crate::ports::{BatchRepository, ObjectStorage, ProgressStore, WebhookChannel};
use crate::table;

/// Drives one batch end-to-end: load, expand, process, collapse, persist,
/// finalize, signal.
pub struct BatchOrchestrator {
    batches: Arc<dyn BatchRepository>,
    storage: Arc<dyn ObjectStorage>,
    progress: Arc<dyn ProgressStore>,
    webhooks: Arc<dyn WebhookChannel>,
    processor: ImageProcessor,
    config: PipelineConfig,
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("processor", &self.processor)
            .field("config", &self.config)
            .finish()
    }
}

impl BatchOrchestrator {
    pub fn new(
        batches: Arc<dyn BatchRepository>,
        storage: Arc<dyn ObjectStorage>,
        progress: Arc<dyn ProgressStore>,
        webhooks: Arc<dyn WebhookChannel>,
        config: PipelineConfig,
    ) -> Self {
        let processor = ImageProcessor::new(storage.clone());

        Self {
            batches,
            storage,
            progress,
            webhooks,
            processor,
            config,
        }
    }

    /// Process the batch identified by `id`.
    ///
    /// The consumer loop logs and swallows whatever this returns; an error
    /// abandons the run with the batch record left at its last reported
    /// progress, and the triggering queue message stays consumed either way.
    pub async fn run(&self, id: BatchId) -> Result<()> {
        let batch = self
            .batches
            .get(id)
            .await?
            .ok_or_else(|| PipelineError::BatchNotFound(id.as_str()))?;

        info!("Processing batch {} ({})", id, batch.original_file_name);

        self.checkpoint(id, 10.0).await;

        let raw = self.storage.download_table(&batch.file_name).await?;
        let rows = table::read_catalog(&raw)?;

        let units = reshape::expand(&rows);
        let total = units.len();
        self.checkpoint(id, self.config.progress_start).await;

        let tracker = Arc::new(ProgressTracker::new(
            id,
            self.progress.clone(),
            total,
            self.config.progress_start,
            self.config.progress_end,
        ));
        let resolved =
            runner::run_units(&self.processor, units, tracker, self.config.worker_count).await;

        self.checkpoint(id, self.config.progress_end).await;

        let result_rows = reshape::collapse(resolved);
        let out = table::write_catalog(&result_rows)?;

        self.storage.upload_table(&batch.file_name, out).await?;
        self.checkpoint(id, 99.0).await;

        self.batches.mark_completed(id).await?;

        // The durable record now says completed; the transient key would
        // only shadow it.
        if let Err(e) = self.progress.clear(id).await {
            warn!("Failed to clear progress key for {}: {}", id, e);
        }

        if let Some(url) = batch.webhook_url.as_deref() {
            // Fire-and-forget: everything after the publish belongs to the
            // listener.
            if let Err(e) = self.webhooks.publish(id, url).await {
                warn!("Failed to publish webhook signal for {}: {}", id, e);
            }
        }

        info!("Batch {} completed ({} units)", id, total);

        Ok(())
    }

    /// Publish a coarse checkpoint. Progress writes never fail the run.
    async fn checkpoint(&self, id: BatchId, progress: f64) {
        if let Err(e) = self
            .progress
            .set(id, BatchStatus::InProgress, progress)
            .await
        {
            warn!("Failed to publish progress for {}: {}", id, e);
        }
    }
}
