use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::ObjectStore as _;
use object_store::path::Path as StorePath;
use tracing::debug;

use crate::Result;
use crate::ports::ObjectStorage;

/// Where tables and images live under the bucket, and how public references
/// are formed from upload paths.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Prefix the submitted source tables are read from.
    pub source_prefix: String,
    /// Prefix the result tables are written to.
    pub result_prefix: String,
    /// Prefix the recompressed images are written to.
    pub image_prefix: String,
    /// Base URL prepended to object paths to form public references.
    pub public_base: String,
}

/// Object-storage adapter over any [`object_store::ObjectStore`] backend.
///
/// Production wires a cloud bucket; tests run against
/// `object_store::memory::InMemory`.
#[derive(Clone)]
pub struct BucketStorage {
    store: Arc<dyn object_store::ObjectStore>,
    layout: StorageLayout,
}

impl fmt::Debug for BucketStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketStorage")
            .field("store", &self.store)
            .field("layout", &self.layout)
            .finish()
    }
}

impl BucketStorage {
    pub fn new(store: Arc<dyn object_store::ObjectStore>, layout: StorageLayout) -> Self {
        Self { store, layout }
    }

    fn public_url(&self, path: &StorePath) -> String {
        format!("{}/{}", self.layout.public_base.trim_end_matches('/'), path)
    }

    async fn put(&self, path: StorePath, bytes: Vec<u8>) -> Result<String> {
        debug!("Storage PUT {} ({} bytes)", path, bytes.len());

        self.store.put(&path, bytes.into()).await?;

        Ok(self.public_url(&path))
    }
}

#[async_trait]
impl ObjectStorage for BucketStorage {
    async fn download_table(&self, file_name: &str) -> Result<Vec<u8>> {
        let path = StorePath::from(format!("{}/{}", self.layout.source_prefix, file_name));
        debug!("Storage GET {}", path);

        let data = self.store.get(&path).await?.bytes().await?;

        Ok(data.to_vec())
    }

    async fn upload_table(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let path = StorePath::from(format!("{}/{}", self.layout.result_prefix, file_name));
        self.put(path, bytes).await
    }

    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let path = StorePath::from(format!("{}/{}", self.layout.image_prefix, file_name));
        self.put(path, bytes).await
    }
}
