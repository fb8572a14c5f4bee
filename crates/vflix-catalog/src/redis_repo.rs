//! Redis-backed video repository.
//!
//! Records are stored as one JSON value per video under
//! `vflix:video:<id>`, so `commit_manifests` is a single `SET` — readers
//! never observe a partially updated manifest ladder.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use vflix_models::{Video, VideoId};

use crate::error::{CatalogError, CatalogResult};
use crate::repo::VideoRepository;

const DEFAULT_KEY_PREFIX: &str = "vflix:video:";

pub struct RedisVideoRepository {
    client: redis::Client,
    key_prefix: String,
}

impl RedisVideoRepository {
    pub fn new(redis_url: &str) -> CatalogResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        })
    }

    /// Create from the `REDIS_URL` environment variable.
    pub fn from_env() -> CatalogResult<Self> {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        Self::new(&redis_url)
    }

    fn key(&self, id: VideoId) -> String {
        format!("{}{}", self.key_prefix, id)
    }
}

#[async_trait]
impl VideoRepository for RedisVideoRepository {
    async fn get(&self, id: VideoId) -> CatalogResult<Video> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(self.key(id)).await?;
        let payload = payload.ok_or(CatalogError::VideoNotFound(id))?;
        Ok(serde_json::from_str(&payload)?)
    }

    async fn insert(&self, video: Video) -> CatalogResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(&video)?;
        conn.set::<_, _, ()>(self.key(video.id), payload).await?;
        debug!("Stored video {}", video.id);
        Ok(())
    }

    async fn commit_manifests(&self, video: &Video) -> CatalogResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // Refuse to resurrect a record deleted while the job ran.
        let exists: bool = conn.exists(self.key(video.id)).await?;
        if !exists {
            return Err(CatalogError::VideoNotFound(video.id));
        }

        let payload = serde_json::to_string(video)?;
        conn.set::<_, _, ()>(self.key(video.id), payload).await?;
        debug!("Committed manifests for video {}", video.id);
        Ok(())
    }

    async fn remove(&self, id: VideoId) -> CatalogResult<Video> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get_del(self.key(id)).await?;
        let payload = payload.ok_or(CatalogError::VideoNotFound(id))?;
        Ok(serde_json::from_str(&payload)?)
    }
}
