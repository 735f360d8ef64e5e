//! # Pixmill Core
//!
//! Core library for the pixmill catalog processor: the row-expansion /
//! bounded-parallel-transform / row-collapse pipeline, the ports it runs
//! against, and the infrastructure adapters binding those ports to
//! PostgreSQL, Redis, and object storage.
//!
//! ## Overview
//!
//! A batch run downloads a product catalog table, expands every row into one
//! unit per referenced image, recompresses each image on a bounded worker
//! pool while publishing monotone progress, collapses the units back into
//! the original row shape (failures recorded inline, never retried), uploads
//! the result table, finalizes the batch record, and hands webhook delivery
//! off through a fire-and-forget pub/sub signal.
//!
//! ## Architecture
//!
//! - [`pipeline`]: expander/collapser, unit processor, bounded runner, and
//!   the batch orchestrator
//! - [`ports`]: async traits decoupling the pipeline from its collaborators
//! - [`infra`]: PostgreSQL, Redis, and object-storage adapters
//! - [`webhook`]: the signal codec and the delivery notifier
//! - [`table`]: the CSV catalog codec
#![allow(missing_docs)]

/// Pipeline tuning knobs
pub mod config;

/// Error types and error handling utilities
pub mod error;

/// Infrastructure adapters for the collaborator ports
pub mod infra;

/// The batch-processing pipeline
pub mod pipeline;

/// Collaborator ports the pipeline runs against
pub mod ports;

/// CSV catalog codec
pub mod table;

/// Webhook signal codec and delivery
pub mod webhook;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{PipelineError, Result};
