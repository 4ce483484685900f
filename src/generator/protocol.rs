//! HTTP contracts of the generator endpoints.

use super::types::GeneratorStatus;
use serde::{Deserialize, Serialize};

pub const ENDPOINT_GENERATOR_START: &str = "/api/hot-items/generator/start";
pub const ENDPOINT_GENERATOR_STOP: &str = "/api/hot-items/generator/stop";
pub const ENDPOINT_GENERATOR_STATUS: &str = "/api/hot-items/generator/status";
pub const ENDPOINT_GENERATOR_RATE: &str = "/api/hot-items/generator/rate";
pub const ENDPOINT_GENERATOR_RESET: &str = "/api/hot-items/generator/reset";

#[derive(Debug, Deserialize)]
pub struct SetRateParams {
    pub rate: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetRateResponse {
    pub success: bool,
    pub requested_rate: i64,
    pub effective_rate: u32,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratorStatusResponse {
    pub data: GeneratorStatus,
}
