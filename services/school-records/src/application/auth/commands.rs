//! 认证命令与响应

use secrecy::Secret;
use serde::{Deserialize, Serialize};

use crate::application::views::UserView;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginCommand {
    pub email: String,
    pub password: Secret<String>,
}

/// 登录/注册成功后的响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}
