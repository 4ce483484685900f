//! HTTP contracts of the hot item endpoints.

use super::types::{RankedItem, RatingInput};
use crate::generator::types::GeneratorStatus;
use serde::{Deserialize, Serialize};

pub const ENDPOINT_STREAM_START: &str = "/api/hot-items/start";
pub const ENDPOINT_STREAM_STOP: &str = "/api/hot-items/stop";
pub const ENDPOINT_STREAM_STATUS: &str = "/api/hot-items/stream-status";
pub const ENDPOINT_CURRENT: &str = "/api/hot-items/current";
pub const ENDPOINT_CACHE: &str = "/api/hot-items/cache";
pub const ENDPOINT_INGEST: &str = "/api/hot-items/ingest";
pub const ENDPOINT_INGEST_BATCH: &str = "/api/hot-items/ingest/batch";
pub const ENDPOINT_SYSTEM_STATUS: &str = "/api/hot-items/status";

/// Outcome of a command endpoint (start, stop, clear, ...).
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StreamStatusResponse {
    pub is_running: bool,
    pub window_size: usize,
    pub publications: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankingResponse {
    pub count: usize,
    pub timestamp: u64,
    pub description: String,
    pub data: Vec<RankedItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestBatchRequest {
    pub ratings: Vec<RatingInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub accepted: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatusResponse {
    pub stream_running: bool,
    pub hot_items_count: usize,
    pub window_size: usize,
    pub generator: GeneratorStatus,
}
