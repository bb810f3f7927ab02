//! 应用层：按实体划分的记录服务与认证服务

pub mod auth;
pub mod grade;
pub mod mark;
pub mod patch;
pub mod references;
pub mod subject;
pub mod user;
pub mod views;

use std::sync::Arc;

use edu_telemetry::RECORDS_WRITTEN_TOTAL;

use crate::domain::grade::GradeRepository;
use crate::domain::mark::MarkRepository;
use crate::domain::policy::ResourceKind;
use crate::domain::subject::SubjectRepository;
use crate::domain::user::UserRepository;

pub use auth::AuthService;
pub use grade::GradeService;
pub use mark::MarkService;
pub use subject::SubjectService;
pub use user::UserService;

/// 四类记录的仓储集合
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub subjects: Arc<dyn SubjectRepository>,
    pub grades: Arc<dyn GradeRepository>,
    pub marks: Arc<dyn MarkRepository>,
}

/// 写操作类型（metrics 标签）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
    Enroll,
}

impl WriteOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Enroll => "enroll",
        }
    }
}

/// 记录一次成功写入
pub(crate) fn record_write(kind: ResourceKind, op: WriteOp) {
    metrics::counter!(
        RECORDS_WRITTEN_TOTAL,
        "kind" => kind.as_str(),
        "op" => op.as_str()
    )
    .increment(1);
}
