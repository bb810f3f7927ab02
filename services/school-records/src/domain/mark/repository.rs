//! 成绩仓储接口

use async_trait::async_trait;
use edu_common::UserId;
use edu_errors::AppResult;

use super::mark::Mark;
use crate::domain::ids::MarkId;

/// 成绩列表过滤条件，各条件之间为 AND
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkFilter {
    pub student: Option<UserId>,
    pub teacher: Option<UserId>,
}

impl MarkFilter {
    pub fn matches(&self, mark: &Mark) -> bool {
        self.student.is_none_or(|s| mark.student == s)
            && self.teacher.is_none_or(|t| mark.teacher == t)
    }
}

/// 成绩仓储接口
///
/// (student, subject, exam_type, exam_date) 唯一性由存储层保证，
/// 冲突时返回 `AppError::Conflict`，创建与更新均如此
#[async_trait]
pub trait MarkRepository: Send + Sync {
    async fn create(&self, mark: &Mark) -> AppResult<()>;

    /// 记录不存在时返回 false
    async fn update(&self, mark: &Mark) -> AppResult<bool>;

    /// 记录不存在时返回 false
    async fn delete(&self, id: &MarkId) -> AppResult<bool>;

    async fn find_by_id(&self, id: &MarkId) -> AppResult<Option<Mark>>;

    /// 按考试日期倒序
    async fn list(&self, filter: MarkFilter) -> AppResult<Vec<Mark>>;
}
