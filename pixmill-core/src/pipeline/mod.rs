//! The batch-processing pipeline.
//!
//! Data flows strictly downstream: expand rows into units, resolve every
//! unit on the bounded runner, collapse units back into rows. The
//! orchestrator sequences one batch end-to-end.

pub mod encode;
pub mod orchestrator;
pub mod processor;
pub mod reshape;
pub mod runner;

pub use orchestrator::BatchOrchestrator;
pub use processor::ImageProcessor;
