//! 认证后端接口。认证、令牌签发与刷新全部委托给外部服务，
//! 本模块只定义调用契约和 GoTrue REST 实现。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod gotrue;

pub use gotrue::GoTrueClient;

/// 已认证的主体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl AuthUser {
    /// 展示用名称，依次取 metadata 中的 name、email
    pub fn display_name(&self) -> String {
        self.user_metadata
            .get("name")
            .and_then(|v| v.as_str())
            .map(String::from)
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Anonymous".into())
    }
}

/// 认证后端返回的会话
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

/// 注册结果，需要邮箱确认时不会返回会话
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: Option<AuthUser>,
    pub session: Option<AuthSession>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignUpMetadata {
    pub first_name: String,
    pub last_name: String,
    pub mobile: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthBackendError {
    /// 令牌无效或过期，或凭据被拒绝
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// 后端返回的其它业务错误
    #[error("{0}")]
    Rejected(String),
    #[error("auth backend unreachable: {0}")]
    Network(String),
    #[error("unexpected auth backend response: {0}")]
    Malformed(String),
}

impl AuthBackendError {
    /// 面向用户的简短信息，网络类错误不暴露细节
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(msg) | Self::Rejected(msg) if !msg.is_empty() => Some(msg.as_str()),
            _ => None,
        }
    }
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthBackendError>;

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthBackendError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthBackendError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
        email_redirect_to: &str,
    ) -> Result<SignUpOutcome, AuthBackendError>;

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AuthBackendError>;

    async fn update_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<(), AuthBackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthBackendError>;

    /// OAuth 授权地址，纯拼接不发请求
    fn authorize_url(&self, provider: &str, redirect_to: &str, scopes: &str) -> String;
}
