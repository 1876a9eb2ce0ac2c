use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::model::AddCommentRequest;
use crate::{
    AppState, actions::comment, error::AppError, middleware::RequireUser,
    utils::success_to_api_response,
};

#[axum::debug_handler]
pub async fn add_comment(
    State(state): State<AppState>,
    RequireUser(session): RequireUser,
    Path(post_id): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = comment::add_comment(&state, &session.user, post_id, &req.content).await?;
    Ok((StatusCode::CREATED, success_to_api_response(outcome)))
}

#[axum::debug_handler]
pub async fn delete_comment(
    State(state): State<AppState>,
    RequireUser(session): RequireUser,
    Path(comment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    comment::delete_comment(&state, &session.user, comment_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}
