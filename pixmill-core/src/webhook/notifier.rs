use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use pixmill_model::BatchId;

use crate::error::{PipelineError, Result};
use crate::ports::BatchRepository;
use crate::webhook::decode_signal;

/// Delivers one webhook notification and records the outcome on the batch.
///
/// Isolated from the processing pipeline by design: nothing here can reach
/// back into a running batch.
pub struct WebhookNotifier {
    http: reqwest::Client,
    batches: Arc<dyn BatchRepository>,
}

impl fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("http_client", &self.http)
            .finish()
    }
}

impl WebhookNotifier {
    pub fn new(batches: Arc<dyn BatchRepository>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, batches }
    }

    /// Handle one signal payload: validate, issue the single GET, persist
    /// the outcome string.
    ///
    /// The subscriber loop logs and swallows whatever this returns; one bad
    /// message must never stop the listener.
    pub async fn deliver(&self, payload: &str) -> Result<()> {
        let (raw_id, url) = decode_signal(payload)?;
        let batch_id: BatchId = raw_id
            .parse()
            .map_err(|_| PipelineError::InvalidPayload(format!("bad batch id: {raw_id}")))?;

        let outcome = self.request(url).await?;
        self.batches.set_webhook_response(batch_id, &outcome).await?;

        info!("Webhook delivered for {}: {}", batch_id, outcome);

        Ok(())
    }

    async fn request(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        Ok(if status == reqwest::StatusCode::OK {
            format!("Response Status Code:{}", status.as_u16())
        } else {
            format!(
                "Response Status Code:{}, Response reason:{}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown")
            )
        })
    }
}
