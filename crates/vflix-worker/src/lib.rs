//! Transcode worker.
//!
//! This crate provides:
//! - The transcode orchestrator: one run derives every HLS rendition for a
//!   video and commits the manifest paths in a single catalog write
//! - A job executor consuming the Redis Streams queue with retry/DLQ
//!   handling and graceful shutdown
//! - Per-job structured logging

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod transcode;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use logging::JobLogger;
pub use transcode::{run_transcode, TranscodeContext};
