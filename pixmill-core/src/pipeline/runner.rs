use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tracing::warn;

use pixmill_model::{BatchId, BatchStatus, ImageUnit, UnitOutcome};

use crate::pipeline::processor::ImageProcessor;
use crate::ports::ProgressStore;

/// Serialized completion counter publishing a monotone percentage.
///
/// The mutex covers increment, percentage computation, and publication
/// together, so concurrent completions can neither lose an update nor let an
/// observer see the reported value regress. This is the only shared mutable
/// state in the pipeline.
pub struct ProgressTracker {
    batch_id: BatchId,
    sink: Arc<dyn ProgressStore>,
    total: usize,
    start: f64,
    end: f64,
    completed: Mutex<usize>,
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("batch_id", &self.batch_id)
            .field("total", &self.total)
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

impl ProgressTracker {
    pub fn new(
        batch_id: BatchId,
        sink: Arc<dyn ProgressStore>,
        total: usize,
        start: f64,
        end: f64,
    ) -> Self {
        Self {
            batch_id,
            sink,
            total: total.max(1),
            start,
            end,
            completed: Mutex::new(0),
        }
    }

    /// Record one finished unit (success or failure alike) and publish the
    /// new percentage. A progress write failure is logged, never raised: it
    /// must not fail the batch.
    pub async fn record_completion(&self) {
        let mut completed = self.completed.lock().await;
        *completed += 1;

        let progress = self.percentage(*completed);
        if let Err(e) = self
            .sink
            .set(self.batch_id, BatchStatus::InProgress, progress)
            .await
        {
            warn!("Failed to publish progress for {}: {}", self.batch_id, e);
        }
    }

    /// Read the current percentage without recording anything.
    pub async fn current(&self) -> f64 {
        let completed = self.completed.lock().await;
        self.percentage(*completed)
    }

    fn percentage(&self, completed: usize) -> f64 {
        self.start + (self.end - self.start) * completed as f64 / self.total as f64
    }
}

/// Run the processor over every unit with a fixed-size worker pool.
///
/// Units are independent; completions interleave arbitrarily. Each spawned
/// task resolves exactly one slot and results are collected positionally, so
/// slot `i` always holds unit `i` regardless of completion order. The pool
/// drains to completion; there is no cancellation path.
pub async fn run_units(
    processor: &ImageProcessor,
    mut units: Vec<ImageUnit>,
    tracker: Arc<ProgressTracker>,
    worker_count: usize,
) -> Vec<ImageUnit> {
    let permits = Arc::new(Semaphore::new(worker_count.max(1)));

    let mut handles = Vec::with_capacity(units.len());
    for unit in &units {
        let url = unit.input_url.clone();
        let permits = permits.clone();
        let processor = processor.clone();
        let tracker = tracker.clone();

        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.expect("semaphore");
            let outcome = processor.process(&url).await;
            tracker.record_completion().await;
            outcome
        }));
    }

    for (unit, handle) in units.iter_mut().zip(handles) {
        unit.output = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Image worker panicked: {e}");
                UnitOutcome::Failed(format!("worker failed: {e}"))
            }
        };
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// Records every published percentage in arrival order.
    #[derive(Debug, Default)]
    struct RecordingSink {
        values: StdMutex<Vec<f64>>,
        cleared: StdMutex<Vec<BatchId>>,
    }

    #[async_trait]
    impl ProgressStore for RecordingSink {
        async fn set(&self, _id: BatchId, _status: BatchStatus, progress: f64) -> crate::Result<()> {
            self.values.lock().unwrap().push(progress);
            Ok(())
        }

        async fn clear(&self, id: BatchId) -> crate::Result<()> {
            self.cleared.lock().unwrap().push(id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn concurrent_completions_publish_a_monotone_sequence() {
        let sink = Arc::new(RecordingSink::default());
        let total = 40;
        let tracker = Arc::new(ProgressTracker::new(
            BatchId::new(),
            sink.clone(),
            total,
            20.0,
            80.0,
        ));

        let mut handles = Vec::new();
        for _ in 0..total {
            let tracker = tracker.clone();
            handles.push(tokio::spawn(async move {
                tracker.record_completion().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(tracker.current().await, 80.0);

        let values = sink.values.lock().unwrap();
        assert_eq!(values.len(), total);
        assert!(
            values.windows(2).all(|w| w[0] <= w[1]),
            "progress regressed: {values:?}"
        );
        assert!(values[0] > 20.0);
        assert_eq!(*values.last().unwrap(), 80.0);
    }

    #[tokio::test]
    async fn a_single_unit_lands_exactly_on_the_end_bound() {
        let sink = Arc::new(RecordingSink::default());
        let tracker = ProgressTracker::new(BatchId::new(), sink.clone(), 1, 20.0, 80.0);

        tracker.record_completion().await;

        assert_eq!(*sink.values.lock().unwrap(), vec![80.0]);
    }

    #[tokio::test]
    async fn results_stay_positional_when_completions_interleave() {
        use crate::infra::storage::{BucketStorage, StorageLayout};
        use crate::pipeline::reshape;
        use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
        use object_store::memory::InMemory;
        use pixmill_model::CatalogRow;
        use std::io::Cursor;
        use std::time::Duration;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let jpeg = {
            let img = RgbImage::from_fn(32, 32, |x, y| Rgb([x as u8 * 8, y as u8 * 8, 64]));
            let mut out = Cursor::new(Vec::new());
            DynamicImage::ImageRgb8(img)
                .write_to(&mut out, ImageFormat::Jpeg)
                .unwrap();
            out.into_inner()
        };

        let server = MockServer::start().await;
        // The first unit finishes last; later units must still land in
        // their own slots.
        Mock::given(method("GET"))
            .and(path("/slow.jpg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(jpeg.clone())
                    .set_delay(Duration::from_millis(250)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fast.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg))
            .mount(&server)
            .await;

        let rows = vec![
            CatalogRow {
                serial_number: "1".into(),
                product_name: "Widget".into(),
                input_image_urls: format!("{0}/slow.jpg,{0}/missing.jpg", server.uri()),
                output_image_urls: String::new(),
            },
            CatalogRow {
                serial_number: "2".into(),
                product_name: "Gadget".into(),
                input_image_urls: format!("{}/fast.jpg", server.uri()),
                output_image_urls: String::new(),
            },
        ];
        let units = reshape::expand(&rows);

        let storage = Arc::new(BucketStorage::new(
            Arc::new(InMemory::new()),
            StorageLayout {
                source_prefix: "tables/source".into(),
                result_prefix: "tables/result".into(),
                image_prefix: "images/processed".into(),
                public_base: "https://cdn.example.com".into(),
            },
        ));
        let processor = ImageProcessor::new(storage);
        let tracker = Arc::new(ProgressTracker::new(
            BatchId::new(),
            Arc::new(RecordingSink::default()),
            units.len(),
            20.0,
            80.0,
        ));

        let resolved = run_units(&processor, units, tracker, 3).await;

        assert_eq!(
            resolved.iter().map(|u| u.row_id).collect::<Vec<_>>(),
            vec![1, 1, 2]
        );
        assert!(resolved[0].output.is_stored());
        assert!(resolved[1].output.is_failed());
        assert!(resolved[2].output.is_stored());
    }
}
