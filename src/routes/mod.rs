use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::middleware::{access_middleware, log_errors};

pub mod auth;
pub mod blog;
pub mod comment;
pub mod health;

/// 组装全部路由，会话中间件作用于所有路径
pub fn build_router(state: AppState) -> Router {
    // 认证相关路由
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/google", get(auth::google))
        .route("/api/me", get(auth::me));

    // 文章与评论路由
    let blog_routes = Router::new()
        .route("/api/blogs", get(blog::list_posts).post(blog::create_post))
        .route("/api/blogs/analyze", post(blog::analyze_post))
        .route(
            "/api/blogs/{id}",
            get(blog::get_post)
                .put(blog::update_post)
                .delete(blog::delete_post),
        )
        .route("/api/blogs/{id}/comments", post(comment::add_comment))
        .route("/api/comments/{id}", delete(comment::delete_comment));

    Router::new()
        .route("/health", get(health::health))
        .merge(auth_routes)
        .merge(blog_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            access_middleware,
        ))
        .layer(axum::middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
