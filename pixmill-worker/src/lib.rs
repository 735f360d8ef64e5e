//! Shared startup plumbing for the pixmill daemon binaries.
#![allow(missing_docs)]

pub mod config;
pub mod storage;
