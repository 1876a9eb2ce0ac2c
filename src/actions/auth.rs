use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::{AuthBackendError, AuthSession, AuthUser, SignUpMetadata};
use crate::error::AppError;
use crate::session::CurrentSession;
use crate::store::{NewProfile, Profile};
use crate::utils::validation::{MIN_PASSWORD_LEN, validate_email, validate_password};
use crate::workflow::types::{OnboardUserRequest, SignupSource};

pub const MSG_LOGIN_REQUIRED_FIELDS: &str = "이메일과 비밀번호를 입력해주세요";
pub const MSG_LOGIN_FAILED: &str = "로그인에 실패했습니다";
pub const MSG_SIGNUP_REQUIRED_FIELDS: &str = "필수 항목을 모두 입력해주세요";
pub const MSG_PASSWORD_TOO_SHORT: &str = "비밀번호는 최소 6자 이상이어야 합니다";
pub const MSG_INVALID_EMAIL: &str = "올바른 이메일 주소를 입력해주세요";
pub const MSG_SIGNUP_FAILED: &str = "회원가입에 실패했습니다";
pub const MSG_EMAIL_REQUIRED: &str = "이메일을 입력해주세요";
pub const MSG_RESET_REQUEST_FAILED: &str = "비밀번호 재설정 요청에 실패했습니다";
pub const MSG_NEW_PASSWORD_REQUIRED: &str = "새 비밀번호를 입력해주세요";
pub const MSG_RESET_FAILED: &str = "비밀번호 변경에 실패했습니다";

const DEFAULT_ROLE: &str = "user";
const OAUTH_PROVIDER: &str = "google";
const OAUTH_SCOPES: &str = "email profile";

/// 认证操作的结果，error 与 redirect 至多一个
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl AuthResult {
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            redirect: None,
        }
    }

    pub fn redirect(to: impl Into<String>) -> Self {
        Self {
            error: None,
            redirect: Some(to.into()),
        }
    }
}

/// 登录/注册成功时附带需要写入 cookie 的会话
#[derive(Debug)]
pub struct AuthOutcome {
    pub result: AuthResult,
    pub session: Option<AuthSession>,
}

impl AuthOutcome {
    fn failed(msg: impl Into<String>) -> Self {
        Self {
            result: AuthResult::error(msg),
            session: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "firstName", alias = "first_name")]
    pub first_name: String,
    #[serde(default, rename = "lastName", alias = "last_name")]
    pub last_name: String,
    #[serde(default)]
    pub mobile: Option<String>,
}

/// 后端错误转成用户可见信息，取不到时用默认文案
fn backend_message(err: &AuthBackendError, fallback: &str) -> String {
    match err {
        AuthBackendError::Network(_) | AuthBackendError::Malformed(_) => {
            tracing::error!("Auth backend call failed: {}", err)
        }
        _ => tracing::debug!("Auth backend rejected request: {}", err),
    }
    err.user_message().unwrap_or(fallback).to_string()
}

pub async fn login(state: &AppState, email: &str, password: &str) -> AuthOutcome {
    if email.trim().is_empty() || password.is_empty() {
        return AuthOutcome::failed(MSG_LOGIN_REQUIRED_FIELDS);
    }

    match state.auth.sign_in_with_password(email.trim(), password).await {
        Ok(session) => {
            tracing::info!("User {} logged in", session.user.id);
            AuthOutcome {
                result: AuthResult::redirect(&state.config.routes.after_login),
                session: Some(session),
            }
        }
        Err(e) => AuthOutcome::failed(backend_message(&e, MSG_LOGIN_FAILED)),
    }
}

/// 本地校验注册表单，顺序：必填、密码长度、邮箱格式
pub fn validate_signup(form: &SignupForm) -> Result<(), &'static str> {
    if form.email.trim().is_empty()
        || form.password.is_empty()
        || form.first_name.trim().is_empty()
        || form.last_name.trim().is_empty()
    {
        return Err(MSG_SIGNUP_REQUIRED_FIELDS);
    }
    if !validate_password(&form.password, MIN_PASSWORD_LEN) {
        return Err(MSG_PASSWORD_TOO_SHORT);
    }
    if !validate_email(form.email.trim()) {
        return Err(MSG_INVALID_EMAIL);
    }
    Ok(())
}

pub async fn signup(state: &AppState, form: SignupForm) -> AuthOutcome {
    if let Err(msg) = validate_signup(&form) {
        return AuthOutcome::failed(msg);
    }

    let email = form.email.trim().to_string();
    let mobile = form.mobile.filter(|m| !m.trim().is_empty());
    let metadata = SignUpMetadata {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        mobile: mobile.clone(),
    };
    let callback = format!("{}/auth/callback", state.config.auth.site_url);

    let outcome = match state
        .auth
        .sign_up(&email, &form.password, &metadata, &callback)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return AuthOutcome::failed(backend_message(&e, MSG_SIGNUP_FAILED)),
    };

    if let Some(user) = &outcome.user {
        tracing::info!("User {} signed up", user.id);

        if state.config.auto_create_profile {
            let profile = NewProfile {
                user_id: user.id,
                email: email.clone(),
                first_name: metadata.first_name.clone(),
                last_name: metadata.last_name.clone(),
                mobile,
                role: DEFAULT_ROLE.into(),
            };
            // 资料可以之后再补，不影响注册
            if let Err(e) = state.store.insert_profile(&profile).await {
                tracing::warn!("Profile creation failed for {}: {}", user.id, e);
            }
        }

        let onboarding = state
            .workflow
            .onboard_user(&OnboardUserRequest {
                user_id: user.id,
                email: email.clone(),
                first_name: metadata.first_name.clone(),
                last_name: Some(metadata.last_name.clone()),
                signup_source: SignupSource::Email,
                language: None,
            })
            .await;
        if let Some(err) = onboarding.error() {
            tracing::warn!("Onboarding workflow failed for {}: {}", user.id, err);
        }
    }

    AuthOutcome {
        result: AuthResult::redirect(&state.config.routes.after_signup),
        session: outcome.session,
    }
}

pub async fn reset_password_request(state: &AppState, email: &str) -> AuthResult {
    if email.trim().is_empty() {
        return AuthResult::error(MSG_EMAIL_REQUIRED);
    }

    let redirect_to = format!("{}/auth/reset-password", state.config.auth.site_url);
    match state
        .auth
        .reset_password_for_email(email.trim(), &redirect_to)
        .await
    {
        Ok(()) => AuthResult::default(),
        Err(e) => AuthResult::error(backend_message(&e, MSG_RESET_REQUEST_FAILED)),
    }
}

pub fn validate_new_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err(MSG_NEW_PASSWORD_REQUIRED);
    }
    if !validate_password(password, MIN_PASSWORD_LEN) {
        return Err(MSG_PASSWORD_TOO_SHORT);
    }
    Ok(())
}

pub async fn reset_password(
    state: &AppState,
    session: &CurrentSession,
    password: &str,
) -> AuthResult {
    if let Err(msg) = validate_new_password(password) {
        return AuthResult::error(msg);
    }

    match state
        .auth
        .update_password(&session.access_token, password)
        .await
    {
        Ok(()) => {
            tracing::info!("User {} changed password", session.user.id);
            AuthResult::redirect(&state.config.routes.after_password_reset)
        }
        Err(e) => AuthResult::error(backend_message(&e, MSG_RESET_FAILED)),
    }
}

/// 后端登出失败只记日志，本地 cookie 照常清除
pub async fn sign_out(state: &AppState, session: Option<&CurrentSession>) -> AuthResult {
    if let Some(session) = session {
        if let Err(e) = state.auth.sign_out(&session.access_token).await {
            tracing::warn!("Backend sign-out failed for {}: {}", session.user.id, e);
        }
    }
    AuthResult::redirect(&state.config.routes.after_logout)
}

pub fn google_authorize_url(state: &AppState) -> String {
    let redirect_to = format!("{}/auth/callback", state.config.auth.site_url);
    state
        .auth
        .authorize_url(OAUTH_PROVIDER, &redirect_to, OAUTH_SCOPES)
}

pub async fn user_profile(state: &AppState, user: &AuthUser) -> Result<Option<Profile>, AppError> {
    Ok(state.store.find_profile(user.id).await?)
}
