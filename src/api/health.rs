use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: String,
    pub database: String,
    pub uptime_seconds: u64,
}

pub async fn get_health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthDto>>, ApiError> {
    state
        .store()
        .ping()
        .await
        .map_err(|e| ApiError::ServiceUnavailable(format!("Database unreachable: {e}")))?;

    Ok(Json(ApiResponse::success(HealthDto {
        status: "ok".to_string(),
        database: "ok".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })))
}
