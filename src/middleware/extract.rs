use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use super::access::{RequestIdentity, login_redirect};
use crate::AppState;
use crate::session::CurrentSession;

/// 可选身份
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentSession>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<RequestIdentity>()
            .and_then(|id| id.0.clone());
        Ok(MaybeUser(identity))
    }
}

/// 必须登录，否则跳转登录页而不是返回 401
#[derive(Debug, Clone)]
pub struct RequireUser(pub CurrentSession);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts
            .extensions
            .get::<RequestIdentity>()
            .and_then(|id| id.0.clone())
        {
            Some(session) => Ok(RequireUser(session)),
            None => {
                let location = login_redirect(&state.config.routes, parts.uri.path());
                Err(Redirect::temporary(&location).into_response())
            }
        }
    }
}
