//! Catalog video store and lifecycle hooks.
//!
//! The catalog itself (upload forms, browse APIs, admin) lives elsewhere;
//! this crate is the seam the transcode pipeline talks to:
//! - [`VideoRepository`]: fetch a video by id, write back its manifest
//!   fields in one update
//! - implementations: in-memory (tests, local runs) and Redis-backed
//! - [`LifecycleHooks`]: explicit create/delete event dispatch into the job
//!   queue and the filesystem

pub mod error;
pub mod events;
pub mod redis_repo;
pub mod repo;

pub use error::{CatalogError, CatalogResult};
pub use events::{CatalogEvent, JobDispatcher, LifecycleHooks};
pub use redis_repo::RedisVideoRepository;
pub use repo::{MemoryVideoRepository, VideoRepository};
