//! Redis Streams job queue.
//!
//! This crate provides:
//! - Job enqueueing via Redis Streams with at-least-once delivery
//! - Worker consumption through consumer groups
//! - Retry counting and a dead-letter stream
//! - Idempotency-key deduplication on enqueue

pub mod error;
pub mod job;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use job::{QueueJob, TranscodeVideoJob};
pub use queue::{JobQueue, QueueConfig};
