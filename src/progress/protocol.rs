//! HTTP contracts of the job progress endpoints.

use super::types::JobReport;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const ENDPOINT_PROGRESS: &str = "/api/ratings/progress";
pub const ENDPOINT_JOB_PROGRESS: &str = "/api/ratings/progress/:job_id";

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

#[derive(Debug, Serialize, Deserialize)]
pub struct JobProgressResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JobReport>,
}

impl JobProgressResponse {
    pub fn found(report: JobReport) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: None,
            data: Some(report),
        }
    }

    pub fn not_found(job_id: &str) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: Some(format!("No job with id {}", job_id)),
            data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllJobsResponse {
    pub status: String,
    pub total_jobs: usize,
    pub jobs: HashMap<String, JobReport>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub status: String,
    pub removed: usize,
    pub remaining: usize,
}
