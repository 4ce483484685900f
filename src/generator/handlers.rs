use super::generator::RatingGenerator;
use super::protocol::*;
use crate::window::protocol::ActionResponse;

use axum::{extract::Query, http::StatusCode, Extension, Json};
use std::sync::Arc;

pub async fn handle_generator_start(
    Extension(generator): Extension<Arc<RatingGenerator>>,
) -> (StatusCode, Json<ActionResponse>) {
    match generator.start() {
        Ok(()) => (
            StatusCode::OK,
            Json(ActionResponse::ok("Rating generator started")),
        ),
        Err(e) => {
            tracing::error!("Failed to start rating generator: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActionResponse::failed(format!(
                    "Failed to start rating generator: {}",
                    e
                ))),
            )
        }
    }
}

pub async fn handle_generator_stop(
    Extension(generator): Extension<Arc<RatingGenerator>>,
) -> (StatusCode, Json<ActionResponse>) {
    generator.stop().await;
    (
        StatusCode::OK,
        Json(ActionResponse::ok("Rating generator stopped")),
    )
}

pub async fn handle_generator_status(
    Extension(generator): Extension<Arc<RatingGenerator>>,
) -> Json<GeneratorStatusResponse> {
    Json(GeneratorStatusResponse {
        data: generator.status(),
    })
}

pub async fn handle_set_rate(
    Extension(generator): Extension<Arc<RatingGenerator>>,
    Query(params): Query<SetRateParams>,
) -> (StatusCode, Json<SetRateResponse>) {
    match generator.set_rate(params.rate).await {
        Ok(effective_rate) => (
            StatusCode::OK,
            Json(SetRateResponse {
                success: true,
                requested_rate: params.rate,
                effective_rate,
                message: format!("Generation rate set to {} ratings/s", effective_rate),
            }),
        ),
        Err(e) => {
            tracing::error!("Failed to restart generator after rate change: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SetRateResponse {
                    success: false,
                    requested_rate: params.rate,
                    effective_rate: generator.status().rate,
                    message: format!("Rate updated but restart failed: {}", e),
                }),
            )
        }
    }
}

pub async fn handle_generator_reset(
    Extension(generator): Extension<Arc<RatingGenerator>>,
) -> (StatusCode, Json<ActionResponse>) {
    generator.reset_counter();
    (
        StatusCode::OK,
        Json(ActionResponse::ok("Rating generator counter reset")),
    )
}
