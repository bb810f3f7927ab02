//! 班级仓储接口

use async_trait::async_trait;
use edu_common::UserId;
use edu_errors::AppResult;

use super::grade::{Grade, GradePatch};
use crate::domain::ids::GradeId;

/// 班级仓储接口
#[async_trait]
pub trait GradeRepository: Send + Sync {
    async fn create(&self, grade: &Grade) -> AppResult<()>;

    /// 原子地应用部分更新，只写入补丁中给出的字段；记录不存在时返回 None
    async fn update(&self, id: &GradeId, patch: &GradePatch) -> AppResult<Option<Grade>>;

    /// 记录不存在时返回 false
    async fn delete(&self, id: &GradeId) -> AppResult<bool>;

    async fn find_by_id(&self, id: &GradeId) -> AppResult<Option<Grade>>;

    async fn find_by_ids(&self, ids: &[GradeId]) -> AppResult<Vec<Grade>>;

    /// 按（年级, 分班）排序
    async fn list(&self) -> AppResult<Vec<Grade>>;

    /// 原子地追加学生（已存在时不变）；班级不存在时返回 None
    async fn add_student(&self, id: &GradeId, student: &UserId) -> AppResult<Option<Grade>>;
}
