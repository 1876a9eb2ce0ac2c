use axum::{http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::utils::success_to_api_response;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// 存活检查，不访问任何后端
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        success_to_api_response(HealthResponse { status: "ok" }),
    )
}
