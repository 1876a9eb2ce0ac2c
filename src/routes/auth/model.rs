use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::store::Profile;

// 缺失字段按空串处理，交给业务校验给出提示
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AuthUser,
    pub profile: Option<Profile>,
}
