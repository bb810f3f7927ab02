//! School Records Service Library
//!
//! 模块划分：
//! - `domain`: 实体、角色、授权策略、仓储接口
//! - `application`: 各实体的记录服务与认证服务
//! - `infrastructure`: PostgreSQL 与内存存储
//! - `api`: axum REST 接口

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

use std::sync::Arc;

use axum::Router;
use edu_auth_core::TokenService;

pub use api::rest::AppState;
pub use application::Repositories;

/// 由仓储与令牌服务组装完整路由
pub fn build_router(
    repos: Repositories,
    token_service: Arc<TokenService>,
    allow_self_registration: bool,
) -> Router {
    api::rest::router(AppState::new(repos, token_service, allow_self_registration))
}
