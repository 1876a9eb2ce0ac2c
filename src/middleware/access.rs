use std::collections::HashSet;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use super::route_class::{RouteClass, classify, is_static_asset};
use crate::AppState;
use crate::config::RouteConfig;
use crate::session::CurrentSession;

/// 中间件写入请求扩展的身份，未登录为 None
#[derive(Debug, Clone)]
pub struct RequestIdentity(pub Option<CurrentSession>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    PassThrough,
    Redirect(String),
}

/// 登录页地址，附带原路径作为 redirect 参数
pub fn login_redirect(routes: &RouteConfig, original_path: &str) -> String {
    format!(
        "{}?redirect={}",
        routes.login_path,
        urlencoding::encode(original_path)
    )
}

/// 只看路径和是否登录，不看请求体
pub fn decide(path: &str, authenticated: bool, routes: &RouteConfig) -> AccessDecision {
    match classify(path, &routes.protected[..], &routes.auth_only[..]) {
        RouteClass::Protected if !authenticated => {
            AccessDecision::Redirect(login_redirect(routes, path))
        }
        RouteClass::AuthOnly if authenticated => {
            AccessDecision::Redirect(routes.after_login.clone())
        }
        _ => AccessDecision::PassThrough,
    }
}

pub async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if is_static_asset(&path) {
        return next.run(req).await;
    }

    let resolved = state.sessions.resolve(req.headers()).await;

    match decide(&path, resolved.session.is_some(), &state.config.routes) {
        AccessDecision::Redirect(location) => {
            tracing::debug!("Redirecting {} -> {}", path, location);
            // 跳转响应同样带上刷新或清除后的 cookie
            (resolved.jar, Redirect::temporary(&location)).into_response()
        }
        AccessDecision::PassThrough => {
            req.extensions_mut()
                .insert(RequestIdentity(resolved.session));
            let response = next.run(req).await;
            merge_session_cookies(resolved.jar, response)
        }
    }
}

/// 把会话解析产生的 cookie 并入处理器响应；处理器已写过的同名 cookie 以处理器为准
fn merge_session_cookies(jar: CookieJar, mut response: Response) -> Response {
    let written: HashSet<String> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(cookie_name)
        .collect();

    let session_cookies = jar.into_response();
    for value in session_cookies.headers().get_all(SET_COOKIE) {
        match cookie_name(value) {
            Some(name) if written.contains(&name) => {
                tracing::debug!("Handler already set cookie {}, keeping its value", name);
            }
            _ => {
                response.headers_mut().append(SET_COOKIE, value.clone());
            }
        }
    }
    response
}

fn cookie_name(value: &HeaderValue) -> Option<String> {
    let raw = value.to_str().ok()?;
    Cookie::parse(raw).ok().map(|c| c.name().to_string())
}
