use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;

use super::model::{ForgotPasswordRequest, LoginRequest, MeResponse, ResetPasswordRequest};
use crate::{
    AppState,
    actions::auth::{self, AuthResult, SignupForm},
    error::AppError,
    middleware::{MaybeUser, RequireUser},
    utils::success_to_api_response,
};

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> (CookieJar, Json<AuthResult>) {
    let outcome = auth::login(&state, &req.email, &req.password).await;
    // 登录成功才写 cookie
    let jar = match &outcome.session {
        Some(session) => state.sessions.attach(jar, session),
        None => jar,
    };
    (jar, Json(outcome.result))
}

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<SignupForm>,
) -> (CookieJar, Json<AuthResult>) {
    let outcome = auth::signup(&state, form).await;
    // 需要邮箱确认时后端不返回会话
    let jar = match &outcome.session {
        Some(session) => state.sessions.attach(jar, session),
        None => jar,
    };
    (jar, Json(outcome.result))
}

#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Json<AuthResult> {
    Json(auth::reset_password_request(&state, &req.email).await)
}

#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    RequireUser(session): RequireUser,
    Json(req): Json<ResetPasswordRequest>,
) -> Json<AuthResult> {
    Json(auth::reset_password(&state, &session, &req.password).await)
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    MaybeUser(session): MaybeUser,
    jar: CookieJar,
) -> (CookieJar, Json<AuthResult>) {
    let result = auth::sign_out(&state, session.as_ref()).await;
    (state.sessions.clear(jar), Json(result))
}

#[axum::debug_handler]
pub async fn google(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&auth::google_authorize_url(&state))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    RequireUser(session): RequireUser,
) -> Result<impl IntoResponse, AppError> {
    let profile = auth::user_profile(&state, &session.user).await?;
    Ok((
        StatusCode::OK,
        success_to_api_response(MeResponse {
            user: session.user,
            profile,
        }),
    ))
}
