//! 用户命令（请求负载）

use secrecy::Secret;
use serde::Deserialize;

use crate::application::patch::double_option;
use crate::domain::ids::{GradeId, SubjectId};

/// 创建用户
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserCommand {
    pub name: String,
    pub email: String,
    pub password: Secret<String>,
    /// 缺省为 student
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub enrolled_grade: Option<GradeId>,
    #[serde(default)]
    pub assigned_subjects: Option<Vec<SubjectId>>,
    #[serde(default)]
    pub assigned_grades: Option<Vec<GradeId>>,
}

/// 部分更新用户；`enrolledGrade: null` 表示清除
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserCommand {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<Secret<String>>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub enrolled_grade: Option<Option<GradeId>>,
    #[serde(default)]
    pub assigned_subjects: Option<Vec<SubjectId>>,
    #[serde(default)]
    pub assigned_grades: Option<Vec<GradeId>>,
}
