//! # Pixmill Webhook Listener
//!
//! Pub/sub subscriber daemon: consumes fire-and-forget signals published by
//! the worker and performs the outbound webhook notification for each.
//!
//! Isolated from batch processing by design — every delivery error is
//! logged and swallowed so one malformed or failing notification never
//! stops the listener.

use std::sync::Arc;

use anyhow::Context;
use futures_util::StreamExt;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pixmill_core::infra::postgres::PostgresBatchRepository;
use pixmill_core::infra::redis::subscribe_webhooks;
use pixmill_core::webhook::{WEBHOOK_CHANNEL, WebhookNotifier};
use pixmill_worker::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
        .context("failed to connect to postgres")?;

    let notifier = WebhookNotifier::new(Arc::new(PostgresBatchRepository::new(pool)));

    let mut pubsub = subscribe_webhooks(&config.redis_url).await?;

    info!("Webhook subscriber started");

    {
        let mut messages = pubsub.on_message();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                message = messages.next() => {
                    let Some(message) = message else { break };

                    let payload: String = match message.get_payload() {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!("Ignoring undecodable message: {e}");
                            continue;
                        }
                    };

                    if let Err(e) = notifier.deliver(&payload).await {
                        error!("Webhook delivery failed: {e}");
                    }
                }
            }
        }
    }

    // Drop the subscription before the connection goes away.
    pubsub.unsubscribe(WEBHOOK_CHANNEL).await.ok();
    info!("Shutting down");

    Ok(())
}
