//! Transcode worker binary.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vflix_catalog::RedisVideoRepository;
use vflix_media::{FfmpegPipeline, FfmpegRunner};
use vflix_models::StorageLayout;
use vflix_queue::JobQueue;
use vflix_worker::{JobExecutor, TranscodeContext, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vflix=info".parse().expect("static directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting vflix-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let queue = JobQueue::from_env().context("failed to create job queue")?;
    let repo = RedisVideoRepository::from_env().context("failed to create video repository")?;

    // Every tool invocation runs under the job deadline, and the shutdown
    // signal cancels whatever is in flight.
    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    let runner = FfmpegRunner::new()
        .with_timeout(config.job_timeout)
        .with_cancel(cancel_rx);
    let pipeline = FfmpegPipeline::with_runner(runner).context("ffmpeg is not available")?;

    let layout = StorageLayout::new(&config.media_root);
    let ctx = TranscodeContext::new(Arc::new(repo), Arc::new(pipeline), layout);

    let executor = Arc::new(JobExecutor::new(config, queue, ctx));

    let shutdown_executor = Arc::clone(&executor);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        let _ = cancel_tx.send(true);
        shutdown_executor.shutdown();
    });

    executor.run().await.context("executor failed")?;

    info!("Worker shutdown complete");
    Ok(())
}
