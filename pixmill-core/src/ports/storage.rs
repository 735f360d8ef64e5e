use async_trait::async_trait;

use crate::Result;

/// Object storage port for catalog tables and processed images.
///
/// Uploads return the public reference string recorded in the result table;
/// where objects live under the bucket is the adapter's concern.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Fetch the submitted source table by its stored name.
    async fn download_table(&self, file_name: &str) -> Result<Vec<u8>>;

    /// Upload the result table under the same name as the source; the
    /// result prefix keeps the two apart.
    async fn upload_table(&self, file_name: &str, bytes: Vec<u8>) -> Result<String>;

    /// Upload one recompressed image under a freshly generated name.
    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String>;
}
