//! 科目仓储接口

use async_trait::async_trait;
use edu_errors::AppResult;

use super::subject::{Subject, SubjectPatch};
use crate::domain::ids::{GradeId, SubjectId};

/// 科目仓储接口
///
/// 科目代码唯一性由存储层保证，冲突时返回 `AppError::Conflict`
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    async fn create(&self, subject: &Subject) -> AppResult<()>;

    /// 原子地应用部分更新，只写入补丁中给出的字段；记录不存在时返回 None
    async fn update(&self, id: &SubjectId, patch: &SubjectPatch) -> AppResult<Option<Subject>>;

    /// 记录不存在时返回 false
    async fn delete(&self, id: &SubjectId) -> AppResult<bool>;

    async fn find_by_id(&self, id: &SubjectId) -> AppResult<Option<Subject>>;

    async fn find_by_ids(&self, ids: &[SubjectId]) -> AppResult<Vec<Subject>>;

    /// 按名称排序
    async fn list(&self) -> AppResult<Vec<Subject>>;

    /// 原子地追加班级（已存在时不变）；科目不存在时返回 None
    async fn add_grade(&self, id: &SubjectId, grade: &GradeId) -> AppResult<Option<Subject>>;
}
