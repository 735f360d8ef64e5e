//! Webhook hand-off: the signal codec shared by publisher and listener, and
//! the notifier performing the outbound call.

pub mod notifier;

pub use notifier::WebhookNotifier;

use pixmill_model::BatchId;

use crate::error::{PipelineError, Result};

/// Pub/sub channel carrying webhook hand-off signals.
pub const WEBHOOK_CHANNEL: &str = "webhook";

/// Delimiter joining batch id and target url in a signal payload.
pub const WEBHOOK_DELIMITER: &str = "|||";

/// Render a `"{batch_id}|||{url}"` signal payload.
pub fn encode_signal(id: BatchId, url: &str) -> String {
    format!("{id}{WEBHOOK_DELIMITER}{url}")
}

/// Parse a signal payload. A wrong field count fails here, before any
/// network call.
pub fn decode_signal(payload: &str) -> Result<(&str, &str)> {
    let fields: Vec<&str> = payload.split(WEBHOOK_DELIMITER).collect();

    match fields.as_slice() {
        [id, url] => Ok((*id, *url)),
        _ => Err(PipelineError::InvalidPayload(format!(
            "expected 2 '{}'-separated fields, got {}",
            WEBHOOK_DELIMITER,
            fields.len()
        ))),
    }
}
