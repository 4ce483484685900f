use super::aggregator::{WindowAggregator, WINDOW_DURATION_MS};
use super::protocol::*;
use super::types::RatingInput;
use crate::generator::generator::RatingGenerator;

use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;

pub async fn handle_stream_start(
    Extension(aggregator): Extension<Arc<WindowAggregator>>,
) -> (StatusCode, Json<ActionResponse>) {
    match aggregator.start() {
        Ok(()) => (
            StatusCode::OK,
            Json(ActionResponse::ok("Hot item computation started")),
        ),
        Err(e) => {
            tracing::error!("Failed to start hot item computation: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActionResponse::failed(format!("Start failed: {}", e))),
            )
        }
    }
}

pub async fn handle_stream_stop(
    Extension(aggregator): Extension<Arc<WindowAggregator>>,
) -> (StatusCode, Json<ActionResponse>) {
    aggregator.stop().await;
    (
        StatusCode::OK,
        Json(ActionResponse::ok("Hot item computation stopped")),
    )
}

pub async fn handle_stream_status(
    Extension(aggregator): Extension<Arc<WindowAggregator>>,
) -> Json<StreamStatusResponse> {
    Json(StreamStatusResponse {
        is_running: aggregator.is_running(),
        window_size: aggregator.window_len(),
        publications: aggregator.publication_count(),
    })
}

pub async fn handle_current_ranking(
    Extension(aggregator): Extension<Arc<WindowAggregator>>,
) -> Json<RankingResponse> {
    let ranking = aggregator.current_ranking();

    Json(RankingResponse {
        count: ranking.len(),
        timestamp: aggregator.now_ms(),
        description: format!(
            "Most rated items of the last {} minutes",
            WINDOW_DURATION_MS / 60_000
        ),
        data: ranking.as_ref().clone(),
    })
}

pub async fn handle_clear_cache(
    Extension(aggregator): Extension<Arc<WindowAggregator>>,
) -> (StatusCode, Json<ActionResponse>) {
    aggregator.clear_cache();
    (
        StatusCode::OK,
        Json(ActionResponse::ok("Hot item ranking cleared")),
    )
}

pub async fn handle_ingest(
    Extension(aggregator): Extension<Arc<WindowAggregator>>,
    Json(req): Json<RatingInput>,
) -> (StatusCode, Json<IngestResponse>) {
    aggregator.ingest(req.user_id, req.item_id, req.rating, req.timestamp_ms);
    (StatusCode::ACCEPTED, Json(IngestResponse { accepted: 1 }))
}

pub async fn handle_ingest_batch(
    Extension(aggregator): Extension<Arc<WindowAggregator>>,
    Json(req): Json<IngestBatchRequest>,
) -> (StatusCode, Json<IngestResponse>) {
    let accepted = aggregator.ingest_batch(req.ratings);
    (StatusCode::ACCEPTED, Json(IngestResponse { accepted }))
}

pub async fn handle_system_status(
    Extension(aggregator): Extension<Arc<WindowAggregator>>,
    Extension(generator): Extension<Arc<RatingGenerator>>,
) -> Json<SystemStatusResponse> {
    Json(SystemStatusResponse {
        stream_running: aggregator.is_running(),
        hot_items_count: aggregator.current_ranking().len(),
        window_size: aggregator.window_len(),
        generator: generator.status(),
    })
}
