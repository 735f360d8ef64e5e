//! Shared in-memory fakes for the collaborator ports.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use pixmill_core::Result;
use pixmill_core::ports::{BatchRepository, ProgressStore, WebhookChannel};
use pixmill_model::{Batch, BatchId, BatchStatus};

/// Batch store backed by a plain map.
#[derive(Debug, Default)]
pub struct InMemoryBatches {
    records: Mutex<HashMap<BatchId, Batch>>,
}

impl InMemoryBatches {
    pub fn insert(&self, batch: Batch) {
        self.records.lock().unwrap().insert(batch.id, batch);
    }

    pub fn snapshot(&self, id: BatchId) -> Option<Batch> {
        self.records.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl BatchRepository for InMemoryBatches {
    async fn get(&self, id: BatchId) -> Result<Option<Batch>> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn mark_completed(&self, id: BatchId) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(batch) = records.get_mut(&id) {
            batch.status = BatchStatus::Completed;
            batch.progress = 100.0;
            batch.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_webhook_response(&self, id: BatchId, response: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(batch) = records.get_mut(&id) {
            batch.webhook_response = Some(response.to_string());
            batch.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// Progress sink recording every published value and clear call.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub published: Mutex<Vec<(BatchStatus, f64)>>,
    pub cleared: Mutex<Vec<BatchId>>,
}

impl RecordingProgress {
    pub fn values(&self) -> Vec<f64> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(_, progress)| *progress)
            .collect()
    }
}

#[async_trait]
impl ProgressStore for RecordingProgress {
    async fn set(&self, _id: BatchId, status: BatchStatus, progress: f64) -> Result<()> {
        self.published.lock().unwrap().push((status, progress));
        Ok(())
    }

    async fn clear(&self, id: BatchId) -> Result<()> {
        self.cleared.lock().unwrap().push(id);
        Ok(())
    }
}

/// Webhook channel collecting published signals instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingWebhooks {
    pub signals: Mutex<Vec<(BatchId, String)>>,
}

#[async_trait]
impl WebhookChannel for RecordingWebhooks {
    async fn publish(&self, id: BatchId, url: &str) -> Result<()> {
        self.signals.lock().unwrap().push((id, url.to_string()));
        Ok(())
    }
}
