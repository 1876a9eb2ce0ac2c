use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::model::ListQuery;
use crate::{
    AppState,
    actions::blog::{self, PostInput},
    error::AppError,
    middleware::{MaybeUser, RequireUser},
    utils::success_to_api_response,
};

#[axum::debug_handler]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = blog::list_posts(&state, query.search, query.page).await?;
    Ok((StatusCode::OK, success_to_api_response(page)))
}

#[axum::debug_handler]
pub async fn create_post(
    State(state): State<AppState>,
    RequireUser(session): RequireUser,
    Json(input): Json<PostInput>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = blog::create_post(&state, &session.user, input).await?;
    Ok((StatusCode::CREATED, success_to_api_response(outcome)))
}

#[axum::debug_handler]
pub async fn analyze_post(
    State(state): State<AppState>,
    RequireUser(_session): RequireUser,
    Json(input): Json<PostInput>,
) -> Result<impl IntoResponse, AppError> {
    // 工作流的结果信封原样透传，失败也是 200
    let envelope = blog::analyze_post(&state, &input).await?;
    Ok((StatusCode::OK, success_to_api_response(envelope)))
}

#[axum::debug_handler]
pub async fn get_post(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = blog::get_post(&state, post_id, viewer.as_ref().map(|s| &s.user)).await?;
    Ok((StatusCode::OK, success_to_api_response(detail)))
}

#[axum::debug_handler]
pub async fn update_post(
    State(state): State<AppState>,
    RequireUser(session): RequireUser,
    Path(post_id): Path<Uuid>,
    Json(input): Json<PostInput>,
) -> Result<impl IntoResponse, AppError> {
    blog::update_post(&state, &session.user, post_id, input).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}

#[axum::debug_handler]
pub async fn delete_post(
    State(state): State<AppState>,
    RequireUser(session): RequireUser,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    blog::delete_post(&state, &session.user, post_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}
