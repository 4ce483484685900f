use axum::{
    extract::Extension,
    routing::{delete, get, post, put},
    Router,
};
use clap::Parser;
use hot_ratings::batch::aggregate::MemoryAggregateSink;
use hot_ratings::batch::handlers::{handle_cancel_job, handle_health, handle_process, BatchContext};
use hot_ratings::batch::job::BatchAggregationJob;
use hot_ratings::batch::protocol::{ENDPOINT_HEALTH, ENDPOINT_JOB_CANCEL, ENDPOINT_PROCESS};
use hot_ratings::clock::SystemClock;
use hot_ratings::config::ServerArgs;
use hot_ratings::generator::generator::RatingGenerator;
use hot_ratings::generator::handlers::*;
use hot_ratings::generator::protocol::*;
use hot_ratings::progress::handlers::*;
use hot_ratings::progress::protocol::{ENDPOINT_JOB_PROGRESS, ENDPOINT_PROGRESS};
use hot_ratings::progress::tracker::ProgressTracker;
use hot_ratings::window::aggregator::WindowAggregator;
use hot_ratings::window::handlers::*;
use hot_ratings::window::protocol::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting hot-ratings on {}", args.bind);

    // 1. Live ranking and its load generator:
    let clock = SystemClock::shared();
    let aggregator = WindowAggregator::new(clock.clone());
    let generator = RatingGenerator::new(args.generator_config()?, aggregator.clone());

    // 2. Batch jobs and their progress:
    let tracker = ProgressTracker::new(clock);
    let batch = Arc::new(BatchContext {
        job: BatchAggregationJob::new(
            tracker.clone(),
            MemoryAggregateSink::new(),
            args.progress_interval,
        ),
        default_csv_path: args.default_csv_path.clone(),
    });

    // 3. HTTP Router:
    let app = Router::new()
        .route(ENDPOINT_STREAM_START, post(handle_stream_start))
        .route(ENDPOINT_STREAM_STOP, post(handle_stream_stop))
        .route(ENDPOINT_STREAM_STATUS, get(handle_stream_status))
        .route(ENDPOINT_CURRENT, get(handle_current_ranking))
        .route(ENDPOINT_CACHE, delete(handle_clear_cache))
        .route(ENDPOINT_INGEST, post(handle_ingest))
        .route(ENDPOINT_INGEST_BATCH, post(handle_ingest_batch))
        .route(ENDPOINT_SYSTEM_STATUS, get(handle_system_status))
        .route(ENDPOINT_GENERATOR_START, post(handle_generator_start))
        .route(ENDPOINT_GENERATOR_STOP, post(handle_generator_stop))
        .route(ENDPOINT_GENERATOR_STATUS, get(handle_generator_status))
        .route(ENDPOINT_GENERATOR_RATE, put(handle_set_rate))
        .route(ENDPOINT_GENERATOR_RESET, post(handle_generator_reset))
        .route(ENDPOINT_PROCESS, post(handle_process))
        .route(
            ENDPOINT_PROGRESS,
            get(handle_all_progress).delete(handle_cleanup_jobs),
        )
        .route(ENDPOINT_JOB_PROGRESS, get(handle_job_progress))
        .route(ENDPOINT_JOB_CANCEL, post(handle_cancel_job))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(Extension(aggregator.clone()))
        .layer(Extension(generator.clone()))
        .layer(Extension(tracker))
        .layer(Extension(batch));

    // 4. Start HTTP server:
    tracing::info!("HTTP server listening on {}", args.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 5. Stop background loops:
    generator.stop().await;
    aggregator.stop().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
