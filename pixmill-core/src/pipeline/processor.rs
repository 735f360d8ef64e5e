use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use pixmill_model::UnitOutcome;

use crate::error::{PipelineError, Result};
use crate::pipeline::encode;
use crate::ports::ObjectStorage;

/// Resolves one unit: fetch the source image, recompress it, store the
/// result.
///
/// Pure per-unit, no shared state; one network GET and one store write per
/// call, no retries.
#[derive(Clone)]
pub struct ImageProcessor {
    http: reqwest::Client,
    storage: Arc<dyn ObjectStorage>,
}

impl fmt::Debug for ImageProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageProcessor")
            .field("http_client", &self.http)
            .finish()
    }
}

impl ImageProcessor {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, storage }
    }

    /// Resolve one unit to its outcome. Failures at any step are captured
    /// into the outcome, never raised: one bad image must not abort the
    /// batch.
    pub async fn process(&self, input_url: &str) -> UnitOutcome {
        match self.process_inner(input_url).await {
            Ok(stored_url) => UnitOutcome::Stored(stored_url),
            Err(e) => {
                debug!("Unit failed for {}: {}", input_url, e);
                UnitOutcome::Failed(e.to_string())
            }
        }
    }

    async fn process_inner(&self, input_url: &str) -> Result<String> {
        let bytes = self.fetch(input_url).await?;
        let encoded = encode::recompress(&bytes)?;

        let file_name = format!("{}.{}", Uuid::new_v4(), encoded.extension());
        self.storage.upload_image(&file_name, encoded.bytes).await
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown")
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Fetch(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::{BucketStorage, StorageLayout};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use object_store::memory::InMemory;
    use std::io::Cursor;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn memory_storage() -> Arc<BucketStorage> {
        Arc::new(BucketStorage::new(
            Arc::new(InMemory::new()),
            StorageLayout {
                source_prefix: "tables/source".into(),
                result_prefix: "tables/result".into(),
                image_prefix: "images/processed".into(),
                public_base: "https://cdn.example.com".into(),
            },
        ))
    }

    fn sample_jpeg() -> Vec<u8> {
        let img = RgbImage::from_fn(48, 48, |x, y| Rgb([x as u8 * 5, y as u8 * 5, 100]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn stores_a_recompressed_image_under_a_fresh_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/product.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(sample_jpeg()))
            .mount(&server)
            .await;

        let processor = ImageProcessor::new(memory_storage());
        let outcome = processor
            .process(&format!("{}/product.jpg", server.uri()))
            .await;

        match outcome {
            UnitOutcome::Stored(url) => {
                assert!(url.starts_with("https://cdn.example.com/images/processed/"));
                assert!(url.ends_with(".jpg"));
            }
            other => panic!("expected Stored, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn a_missing_image_fails_with_status_and_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let processor = ImageProcessor::new(memory_storage());
        let outcome = processor.process(&format!("{}/gone.jpg", server.uri())).await;

        match outcome {
            UnitOutcome::Failed(reason) => {
                assert!(reason.contains("404"), "reason was: {reason}");
                assert!(reason.contains("Not Found"), "reason was: {reason}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_bytes_fail_without_aborting() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/not-an-image"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"plain text".to_vec()))
            .mount(&server)
            .await;

        let processor = ImageProcessor::new(memory_storage());
        let outcome = processor
            .process(&format!("{}/not-an-image", server.uri()))
            .await;

        assert!(outcome.is_failed());
    }
}
