use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{AuthBackend, AuthBackendError, AuthSession, AuthUser, SignUpMetadata, SignUpOutcome};
use crate::config::AuthBackendConfig;

/// GoTrue REST 客户端
#[derive(Clone)]
pub struct GoTrueClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

/// GoTrue 错误体的几种写法
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl GoTrueErrorBody {
    fn into_message(self) -> String {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_default()
    }
}

impl GoTrueClient {
    /// 按配置的超时构造，会话解析在每个请求上都会调用后端
    pub fn from_config(config: &AuthBackendConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::new(http, config))
    }

    pub fn new(http: Client, config: &AuthBackendConfig) -> Self {
        Self {
            http,
            base_url: format!("{}/auth/v1", config.url),
            anon_key: config.anon_key.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(&self.anon_key))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, AuthBackendError> {
        let response = builder
            .send()
            .await
            .map_err(|e| AuthBackendError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<GoTrueErrorBody>()
            .await
            .unwrap_or_default()
            .into_message();
        tracing::debug!("auth backend returned {}: {}", status, message);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AuthBackendError::Unauthorized(message),
            // 刷新令牌失效时 GoTrue 返回 400 invalid_grant
            StatusCode::BAD_REQUEST if message.to_lowercase().contains("refresh token") => {
                AuthBackendError::Unauthorized(message)
            }
            s if s.is_server_error() => AuthBackendError::Network(format!("{}: {}", s, message)),
            _ => AuthBackendError::Rejected(message),
        })
    }

    async fn token(&self, grant_type: &str, body: serde_json::Value) -> Result<AuthSession, AuthBackendError> {
        let response = self
            .send(
                self.request(reqwest::Method::POST, "token", None)
                    .query(&[("grant_type", grant_type)])
                    .json(&body),
            )
            .await?;
        response
            .json::<AuthSession>()
            .await
            .map_err(|e| AuthBackendError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl AuthBackend for GoTrueClient {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthBackendError> {
        let response = self
            .send(self.request(reqwest::Method::GET, "user", Some(access_token)))
            .await?;
        response
            .json::<AuthUser>()
            .await
            .map_err(|e| AuthBackendError::Malformed(e.to_string()))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthBackendError> {
        self.token("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthBackendError> {
        self.token("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
        email_redirect_to: &str,
    ) -> Result<SignUpOutcome, AuthBackendError> {
        let response = self
            .send(
                self.request(reqwest::Method::POST, "signup", None)
                    .query(&[("redirect_to", email_redirect_to)])
                    .json(&json!({
                        "email": email,
                        "password": password,
                        "data": metadata,
                    })),
            )
            .await?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AuthBackendError::Malformed(e.to_string()))?;

        // 开启邮箱确认时只返回用户，否则返回完整会话
        if body.get("access_token").is_some() {
            let session: AuthSession = serde_json::from_value(body)
                .map_err(|e| AuthBackendError::Malformed(e.to_string()))?;
            Ok(SignUpOutcome {
                user: Some(session.user.clone()),
                session: Some(session),
            })
        } else {
            let user = serde_json::from_value::<AuthUser>(body).ok();
            Ok(SignUpOutcome { user, session: None })
        }
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AuthBackendError> {
        self.send(
            self.request(reqwest::Method::POST, "recover", None)
                .query(&[("redirect_to", redirect_to)])
                .json(&json!({ "email": email })),
        )
        .await?;
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<(), AuthBackendError> {
        self.send(
            self.request(reqwest::Method::PUT, "user", Some(access_token))
                .json(&json!({ "password": password })),
        )
        .await?;
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthBackendError> {
        self.send(self.request(reqwest::Method::POST, "logout", Some(access_token)))
            .await?;
        Ok(())
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str, scopes: &str) -> String {
        format!(
            "{}/authorize?provider={}&redirect_to={}&scopes={}&access_type=offline",
            self.base_url,
            urlencoding::encode(provider),
            urlencoding::encode(redirect_to),
            urlencoding::encode(scopes),
        )
    }
}
