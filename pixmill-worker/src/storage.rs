use std::sync::Arc;

use anyhow::Context;
use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;

use pixmill_core::infra::storage::{BucketStorage, StorageLayout};

use crate::config::{StorageConfig, StorageProvider};

/// Build the configured cloud bucket behind the storage adapter.
///
/// Credentials come from the provider's usual environment surface; only the
/// bucket name and the optional S3 endpoint override are wired explicitly.
pub fn build(config: &StorageConfig) -> anyhow::Result<BucketStorage> {
    let store: Arc<dyn ObjectStore> = match config.provider {
        StorageProvider::Gcs => Arc::new(
            GoogleCloudStorageBuilder::from_env()
                .with_bucket_name(&config.bucket)
                .build()
                .context("failed to initialize GCS storage")?,
        ),
        StorageProvider::S3 => {
            let mut builder = AmazonS3Builder::from_env().with_bucket_name(&config.bucket);
            if let Some(endpoint) = &config.endpoint {
                builder = builder.with_endpoint(endpoint).with_allow_http(true);
            }
            Arc::new(builder.build().context("failed to initialize S3 storage")?)
        }
    };

    Ok(BucketStorage::new(
        store,
        StorageLayout {
            source_prefix: config.source_prefix.clone(),
            result_prefix: config.result_prefix.clone(),
            image_prefix: config.image_prefix.clone(),
            public_base: config.public_base.clone(),
        },
    ))
}
