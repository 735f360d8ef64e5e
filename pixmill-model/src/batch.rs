use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::BatchId;

/// Lifecycle states of a batch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    InProgress,
    Completed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Pending => "pending",
            BatchStatus::InProgress => "in_progress",
            BatchStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BatchStatus::Pending),
            "in_progress" => Some(BatchStatus::InProgress),
            "completed" => Some(BatchStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted record of one catalog-processing job.
///
/// Created by the upstream submission flow; the worker reads it once per run
/// and advances `status`, `progress`, and `updated_at`. `progress` is
/// non-decreasing while the batch is running. The status/progress pair is the
/// only externally observable signal of a run that was abandoned mid-flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    /// File name as submitted by the user.
    pub original_file_name: String,
    /// Name of the stored table object; the source and result tables share
    /// it and are kept apart by their bucket prefixes.
    pub file_name: String,
    pub status: BatchStatus,
    pub progress: f64,
    pub webhook_url: Option<String>,
    /// Outcome string recorded by the webhook listener after delivery.
    pub webhook_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
