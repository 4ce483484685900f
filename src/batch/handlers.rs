use super::job::BatchAggregationJob;
use super::protocol::*;
use super::source::FileSource;
use crate::progress::protocol::{STATUS_ERROR, STATUS_SUCCESS};

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

/// Shared state of the batch endpoints.
pub struct BatchContext {
    pub job: Arc<BatchAggregationJob>,
    pub default_csv_path: String,
}

/// Registers a job and runs it on the blocking pool. The response only
/// carries the job id; progress is polled separately.
pub async fn handle_process(
    Extension(context): Extension<Arc<BatchContext>>,
    Query(params): Query<ProcessParams>,
) -> (StatusCode, Json<ProcessResponse>) {
    let csv_file_path = params
        .csv_file_path
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| context.default_csv_path.clone());

    let job_id = new_job_id();
    let tracker = context.job.tracker().clone();
    tracker.create_job(
        &job_id,
        0,
        &format!("Rating aggregation - {}", csv_file_path),
    );

    let job = context.job.clone();
    let source = FileSource::new(csv_file_path.clone());
    let run_id = job_id.clone();
    let worker = tokio::task::spawn_blocking(move || {
        // Failures are already recorded on the tracker by the job.
        let _ = job.run(&run_id, &source);
    });

    let watch_id = job_id.clone();
    tokio::spawn(async move {
        if let Err(e) = worker.await {
            tracing::error!("Batch job {} worker crashed: {}", watch_id, e);
            tracker.complete_job(&watch_id, false, &format!("Job crashed: {}", e));
        }
    });

    tracing::info!("Started batch job {} on {}", job_id, csv_file_path);

    (
        StatusCode::OK,
        Json(ProcessResponse {
            status: STATUS_SUCCESS.to_string(),
            message: "Rating aggregation job started".to_string(),
            job_id,
            csv_file_path,
        }),
    )
}

pub async fn handle_cancel_job(
    Extension(context): Extension<Arc<BatchContext>>,
    Path(job_id): Path<String>,
) -> (StatusCode, Json<CancelResponse>) {
    if context.job.tracker().cancel_job(&job_id, "Cancelled on request") {
        (
            StatusCode::OK,
            Json(CancelResponse {
                status: STATUS_SUCCESS.to_string(),
                message: format!("Job {} cancelled", job_id),
            }),
        )
    } else {
        (
            StatusCode::CONFLICT,
            Json(CancelResponse {
                status: STATUS_ERROR.to_string(),
                message: format!("Job {} is unknown or already finished", job_id),
            }),
        )
    }
}

pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        service: "hot-ratings batch aggregation".to_string(),
    })
}

/// `rating-aggregation-` followed by the first 8 hex digits of a UUID v4.
pub fn new_job_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}", JOB_ID_PREFIX, &id[..8])
}
