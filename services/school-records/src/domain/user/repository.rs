//! 用户仓储接口

use async_trait::async_trait;
use edu_common::UserId;
use edu_errors::AppResult;

use super::user::User;
use crate::domain::actor::Role;

/// 用户仓储接口
///
/// 邮箱唯一性由存储层保证，冲突时返回 `AppError::Conflict`
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 创建用户
    async fn create(&self, user: &User) -> AppResult<()>;

    /// 整体覆盖用户；记录不存在时返回 false
    async fn update(&self, user: &User) -> AppResult<bool>;

    /// 删除用户；记录不存在时返回 false
    async fn delete(&self, id: &UserId) -> AppResult<bool>;

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>>;

    /// 按（已小写的）邮箱查找
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// 批量查找，缺失的 ID 直接忽略
    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>>;

    /// 按创建时间升序列出，可按角色过滤
    async fn list(&self, role: Option<Role>) -> AppResult<Vec<User>>;
}
