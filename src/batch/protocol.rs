//! HTTP contracts of the batch endpoints.

use serde::{Deserialize, Serialize};

pub const ENDPOINT_PROCESS: &str = "/api/ratings/process";
pub const ENDPOINT_JOB_CANCEL: &str = "/api/ratings/progress/:job_id/cancel";
pub const ENDPOINT_HEALTH: &str = "/api/ratings/health";

/// Prefix of the ids of jobs started over HTTP.
pub const JOB_ID_PREFIX: &str = "rating-aggregation-";

#[derive(Debug, Default, Deserialize)]
pub struct ProcessParams {
    pub csv_file_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub status: String,
    pub message: String,
    pub job_id: String,
    pub csv_file_path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancelResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
