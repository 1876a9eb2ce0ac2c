//! 会话解析：读取请求 cookie，向认证后端校验，必要时刷新令牌并把新的
//! cookie 写回响应。任何失败都按未登录处理，不会阻断请求。

use std::sync::Arc;

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::{AuthBackend, AuthBackendError, AuthSession, AuthUser};
use crate::config::CookieConfig;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// 当前请求的登录身份，以及对该主体有效的访问令牌
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub user: AuthUser,
    pub access_token: String,
}

#[derive(Debug)]
pub struct ResolvedSession {
    pub session: Option<CurrentSession>,
    /// 只含本次新增或删除的 cookie
    pub jar: CookieJar,
}

impl ResolvedSession {
    fn anonymous(jar: CookieJar) -> Self {
        Self { session: None, jar }
    }
}

#[derive(Clone)]
pub struct SessionResolver {
    backend: Arc<dyn AuthBackend>,
    cookies: CookieConfig,
}

impl SessionResolver {
    pub fn new(backend: Arc<dyn AuthBackend>, cookies: CookieConfig) -> Self {
        Self { backend, cookies }
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> ResolvedSession {
        let jar = CookieJar::from_headers(headers);
        let access = non_empty(jar.get(ACCESS_COOKIE).map(|c| c.value().to_string()));
        let refresh = non_empty(jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()));

        if let Some(access_token) = access {
            match self.backend.get_user(&access_token).await {
                Ok(user) => {
                    return ResolvedSession {
                        session: Some(CurrentSession { user, access_token }),
                        jar,
                    };
                }
                Err(AuthBackendError::Unauthorized(msg)) => {
                    tracing::debug!("Access token rejected: {}", msg);
                }
                Err(e) => {
                    tracing::warn!("Session validation failed: {}", e);
                    return ResolvedSession::anonymous(jar);
                }
            }
        }

        let Some(refresh_token) = refresh else {
            return ResolvedSession::anonymous(jar);
        };

        match self.backend.refresh(&refresh_token).await {
            Ok(session) => {
                tracing::debug!("Refreshed session for {}", session.user.id);
                let jar = self.attach(jar, &session);
                ResolvedSession {
                    session: Some(CurrentSession {
                        user: session.user,
                        access_token: session.access_token,
                    }),
                    jar,
                }
            }
            Err(AuthBackendError::Unauthorized(msg)) => {
                tracing::debug!("Refresh token rejected, clearing session: {}", msg);
                ResolvedSession::anonymous(self.clear(jar))
            }
            Err(e) => {
                tracing::warn!("Session refresh failed: {}", e);
                ResolvedSession::anonymous(jar)
            }
        }
    }

    /// 写入新会话的两个 cookie
    pub fn attach(&self, jar: CookieJar, session: &AuthSession) -> CookieJar {
        let access = Cookie::build((ACCESS_COOKIE, session.access_token.clone()))
            .path("/")
            .http_only(true)
            .secure(self.cookies.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(session.expires_in))
            .build();
        let refresh = Cookie::build((REFRESH_COOKIE, session.refresh_token.clone()))
            .path("/")
            .http_only(true)
            .secure(self.cookies.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.cookies.refresh_max_age_secs))
            .build();
        jar.add(access).add(refresh)
    }

    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
            .remove(Cookie::build(REFRESH_COOKIE).path("/"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
