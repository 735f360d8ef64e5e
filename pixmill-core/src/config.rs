/// Tuning for one batch run.
///
/// The parallel stage reports progress inside `[progress_start,
/// progress_end]`; the orchestrator owns the checkpoints outside that
/// sub-range.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on concurrently processed units. The work is dominated by
    /// the two network calls per unit, so the default leans past the core
    /// count.
    pub worker_count: usize,
    /// Percentage published when parallel processing starts.
    pub progress_start: f64,
    /// Percentage published once every unit has completed.
    pub progress_end: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get() * 2,
            progress_start: 20.0,
            progress_end: 80.0,
        }
    }
}

impl PipelineConfig {
    /// Override the pool bound, keeping the default when `None`.
    pub fn with_worker_count(mut self, worker_count: Option<usize>) -> Self {
        if let Some(count) = worker_count {
            self.worker_count = count.max(1);
        }
        self
    }
}
