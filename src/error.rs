use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::store::StoreError;
use crate::utils::validation::FieldErrors;
use crate::utils::{ApiResponse, error_codes, error_to_api_response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 本地校验失败，不会触达任何后端
    #[error("{0}")]
    Validation(String),
    #[error("validation failed")]
    InvalidFields(FieldErrors),
    /// 记录不存在，或不属于当前用户
    #[error("{0}")]
    NotFound(String),
    /// 认证后端或数据库失败，操作中止
    #[error("{0}")]
    Backend(String),
}

impl AppError {
    /// 记录底层错误，只把简短信息返回给用户
    pub fn backend(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", context, err);
        AppError::Backend(context.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::backend("Database request failed", err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                error_to_api_response::<()>(error_codes::VALIDATION_ERROR, msg),
            )
                .into_response(),
            AppError::InvalidFields(fields) => (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse {
                    code: error_codes::VALIDATION_ERROR,
                    msg: "validation failed".into(),
                    resp_data: Some(fields),
                }),
            )
                .into_response(),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                error_to_api_response::<()>(error_codes::NOT_FOUND, msg),
            )
                .into_response(),
            AppError::Backend(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response::<()>(error_codes::INTERNAL_ERROR, msg),
            )
                .into_response(),
        }
    }
}
