use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::{debug, info};

use pixmill_model::{BatchId, BatchStatus};

use crate::Result;
use crate::ports::{ProgressStore, UploadQueue, WebhookChannel};
use crate::webhook::{WEBHOOK_CHANNEL, encode_signal};

/// Seconds a queue pop blocks before yielding control back to the caller,
/// so shutdown signals get a chance to run.
const QUEUE_POLL_SECONDS: f64 = 5.0;

/// Redis adapter for transient batch state: the progress key and the
/// webhook pub/sub channel.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = redis::Client::open(redis_url)?;
        let mut conn = ConnectionManager::new(client).await?;

        // Liveness marker with a short TTL; doubles as a round-trip check.
        conn.set_ex::<_, _, ()>(
            "pixmill:worker",
            format!("service-initialized-{}", Utc::now().timestamp()),
            600,
        )
        .await?;

        info!("Successfully connected to Redis");

        Ok(Self { conn })
    }
}

#[async_trait]
impl ProgressStore for RedisStore {
    async fn set(&self, id: BatchId, status: BatchStatus, progress: f64) -> Result<()> {
        debug!("Progress SET {}: {}:{}", id, status, progress);

        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(id.as_str(), format!("{}:{}", status.as_str(), progress))
            .await?;

        Ok(())
    }

    async fn clear(&self, id: BatchId) -> Result<()> {
        debug!("Progress DELETE {}", id);

        let mut conn = self.conn.clone();
        conn.del::<_, ()>(id.as_str()).await?;

        Ok(())
    }
}

#[async_trait]
impl WebhookChannel for RedisStore {
    async fn publish(&self, id: BatchId, url: &str) -> Result<()> {
        debug!("Webhook PUBLISH {} -> {}", id, url);

        let mut conn = self.conn.clone();
        conn.publish::<_, _, ()>(WEBHOOK_CHANNEL, encode_signal(id, url))
            .await?;

        Ok(())
    }
}

/// Redis-list adapter for the upload queue: upstream pushes batch ids, the
/// worker pops them one at a time.
pub struct RedisUploadQueue {
    conn: ConnectionManager,
    key: String,
}

impl fmt::Debug for RedisUploadQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisUploadQueue")
            .field("key", &self.key)
            .finish()
    }
}

impl RedisUploadQueue {
    pub async fn connect(redis_url: &str, key: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            key: key.into(),
        })
    }
}

#[async_trait]
impl UploadQueue for RedisUploadQueue {
    async fn next(&mut self) -> Result<Option<String>> {
        let popped: Option<(String, String)> =
            self.conn.blpop(&self.key, QUEUE_POLL_SECONDS).await?;

        Ok(popped.map(|(_, id)| id))
    }
}

/// Open a dedicated pub/sub connection subscribed to the webhook channel.
///
/// Pub/sub needs its own connection; the listener binary drives the returned
/// handle's message stream and unsubscribes on shutdown.
pub async fn subscribe_webhooks(redis_url: &str) -> Result<redis::aio::PubSub> {
    let client = redis::Client::open(redis_url)?;
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(WEBHOOK_CHANNEL).await?;

    info!("Subscribed to '{}' channel", WEBHOOK_CHANNEL);

    Ok(pubsub)
}
