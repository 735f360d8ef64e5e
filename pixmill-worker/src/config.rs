use std::env;

use anyhow::Context;

/// Worker configuration loaded via environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Connection settings
    pub database_url: String,
    pub redis_url: String,

    // Queue settings
    pub queue_key: String,

    // Object storage settings
    pub storage: StorageConfig,

    /// Override for the processing pool bound; defaults to twice the
    /// available cores when unset.
    pub worker_count: Option<usize>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            redis_url: require("REDIS_URL")?,

            queue_key: env::var("UPLOAD_QUEUE_KEY")
                .unwrap_or_else(|_| "pixmill:uploads".to_string()),

            storage: StorageConfig::from_env()?,

            worker_count: env::var("WORKER_COUNT").ok().and_then(|v| v.parse().ok()),
        })
    }
}

/// Which cloud backend serves the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProvider {
    Gcs,
    S3,
}

/// Object-storage settings: provider, bucket, prefixes, and the public base
/// URL returned references are formed from.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub bucket: String,
    /// Endpoint override for S3-compatible emulators and gateways.
    pub endpoint: Option<String>,
    pub public_base: String,
    pub source_prefix: String,
    pub result_prefix: String,
    pub image_prefix: String,
}

impl StorageConfig {
    fn from_env() -> anyhow::Result<Self> {
        let provider = env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "gcs".to_string());
        let provider = match provider.to_lowercase().as_str() {
            "gcs" => StorageProvider::Gcs,
            "s3" => StorageProvider::S3,
            other => anyhow::bail!("unsupported STORAGE_PROVIDER: {other}"),
        };

        Ok(Self {
            provider,
            bucket: require("STORAGE_BUCKET")?,
            endpoint: env::var("STORAGE_ENDPOINT").ok(),
            public_base: require("STORAGE_PUBLIC_URL")?,
            source_prefix: env::var("STORAGE_SOURCE_PREFIX")
                .unwrap_or_else(|_| "tables/source".to_string()),
            result_prefix: env::var("STORAGE_RESULT_PREFIX")
                .unwrap_or_else(|_| "tables/result".to_string()),
            image_prefix: env::var("STORAGE_IMAGE_PREFIX")
                .unwrap_or_else(|_| "images/processed".to_string()),
        })
    }
}

fn require(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{name} is not defined"))
}
