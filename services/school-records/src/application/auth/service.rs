//! 认证服务
//!
//! 登录、注册、当前用户，以及从 Bearer 令牌解析请求主体

use std::sync::Arc;

use edu_auth_core::TokenService;
use edu_errors::{AppError, AppResult};
use secrecy::{ExposeSecret, Secret};
use tracing::{debug, info, warn};

use super::commands::{AuthResponse, LoginCommand};
use crate::application::user::{CreateUserCommand, UserService};
use crate::application::views::UserView;
use crate::domain::actor::{Actor, Role};
use crate::domain::policy::{Action, PolicyEvaluator, ResourceKind};
use crate::domain::user::User;
use crate::error::RecordError;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// 认证服务
#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    token_service: Arc<TokenService>,
    allow_self_registration: bool,
}

impl AuthService {
    pub fn new(
        users: UserService,
        token_service: Arc<TokenService>,
        allow_self_registration: bool,
    ) -> Self {
        Self {
            users,
            token_service,
            allow_self_registration,
        }
    }

    /// 邮箱 + 密码登录
    pub async fn login(&self, cmd: LoginCommand) -> AppResult<AuthResponse> {
        let email = User::normalize_email(&cmd.email)
            .map_err(|_| AppError::unauthenticated(INVALID_CREDENTIALS))?;

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("Login attempt for unknown email");
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
        };

        if !user.password.verify(cmd.password.expose_secret())? {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id, role = %user.role(), "User logged in");
        self.respond_with_token(&user).await
    }

    /// 注册
    ///
    /// 学生与教师在允许自助注册时无需登录；注册管理员（或关闭自助注册时）
    /// 需要管理员身份
    pub async fn register(
        &self,
        actor: Option<&Actor>,
        cmd: CreateUserCommand,
    ) -> AppResult<AuthResponse> {
        let role: Role = match cmd.role.as_deref() {
            Some(raw) => raw.trim().parse()?,
            None => Role::Student,
        };

        if role == Role::Admin || !self.allow_self_registration {
            PolicyEvaluator::decide(actor, Action::Create, ResourceKind::User, None)
                .into_result()?;
        }

        let user = self.users.insert(cmd).await?;
        info!(user_id = %user.id, role = %user.role(), "User registered");

        self.respond_with_token(&user).await
    }

    /// 当前登录用户
    pub async fn me(&self, actor: Option<&Actor>) -> AppResult<UserView> {
        let actor = actor.ok_or_else(|| AppError::unauthenticated("No token, authorization denied"))?;
        let user = self
            .users
            .find_by_id(&actor.id)
            .await?
            .ok_or(RecordError::UserNotFound)?;
        self.users.view(&user).await
    }

    /// 从 Bearer 令牌解析主体
    ///
    /// 令牌无效或用户已不存在时返回 `Ok(None)`，由策略层给出 401；
    /// 角色以存储中的当前值为准
    pub async fn resolve_actor(&self, token: &str) -> AppResult<Option<Actor>> {
        let claims = match self.token_service.validate_access_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "Token validation failed");
                return Ok(None);
            }
        };

        let Ok(user_id) = claims.user_id() else {
            warn!("Token subject is not a valid user id");
            return Ok(None);
        };

        match self.users.find_by_id(&user_id).await? {
            Some(user) => {
                debug!(user_id = %user.id, role = %user.role(), "Token validated");
                Ok(Some(Actor::new(user.id, user.role())))
            }
            None => {
                warn!(user_id = %user_id, "Token refers to a deleted user");
                Ok(None)
            }
        }
    }

    /// 启动时确保管理员账户存在
    pub async fn ensure_bootstrap_admin(
        &self,
        name: &str,
        email: &str,
        password: &Secret<String>,
    ) -> AppResult<()> {
        let normalized = User::normalize_email(email)?;
        if self.users.find_by_email(&normalized).await?.is_some() {
            debug!(email = %normalized, "Bootstrap admin already exists");
            return Ok(());
        }

        let inserted = self
            .users
            .insert(CreateUserCommand {
                name: name.to_string(),
                email: normalized,
                password: password.clone(),
                role: Some(Role::Admin.as_str().to_string()),
                student_id: None,
                teacher_id: None,
                enrolled_grade: None,
                assigned_subjects: None,
                assigned_grades: None,
            })
            .await;

        match inserted {
            Ok(user) => {
                info!(user_id = %user.id, email = %user.email, "Bootstrap admin created");
                Ok(())
            }
            // 其他实例已抢先创建
            Err(AppError::Conflict { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn respond_with_token(&self, user: &User) -> AppResult<AuthResponse> {
        let token = self
            .token_service
            .generate_access_token(&user.id, user.role().as_str())?;
        Ok(AuthResponse {
            token,
            user: self.users.view(user).await?,
        })
    }
}
