use super::protocol::*;
use super::tracker::ProgressTracker;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use std::sync::Arc;

pub async fn handle_job_progress(
    Extension(tracker): Extension<Arc<ProgressTracker>>,
    Path(job_id): Path<String>,
) -> (StatusCode, Json<JobProgressResponse>) {
    match tracker.get_job_report(&job_id) {
        Some(report) => (StatusCode::OK, Json(JobProgressResponse::found(report))),
        None => {
            tracing::debug!("Progress requested for unknown job {}", job_id);
            (
                StatusCode::NOT_FOUND,
                Json(JobProgressResponse::not_found(&job_id)),
            )
        }
    }
}

pub async fn handle_all_progress(
    Extension(tracker): Extension<Arc<ProgressTracker>>,
) -> Json<AllJobsResponse> {
    let jobs = tracker.get_all_job_reports();

    Json(AllJobsResponse {
        status: STATUS_SUCCESS.to_string(),
        total_jobs: jobs.len(),
        jobs,
    })
}

pub async fn handle_cleanup_jobs(
    Extension(tracker): Extension<Arc<ProgressTracker>>,
) -> Json<CleanupResponse> {
    let removed = tracker.cleanup_completed_jobs();

    Json(CleanupResponse {
        status: STATUS_SUCCESS.to_string(),
        removed,
        remaining: tracker.job_count(),
    })
}
