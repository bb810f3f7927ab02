//! 班级命令

use edu_common::UserId;
use serde::Deserialize;

use crate::application::patch::double_option;
use crate::domain::ids::SubjectId;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateGradeCommand {
    pub name: String,
    pub level: i64,
    pub section: String,
    #[serde(default)]
    pub students: Vec<UserId>,
    #[serde(default)]
    pub subjects: Vec<SubjectId>,
    #[serde(default)]
    pub class_teacher: Option<UserId>,
}

/// 部分更新；`classTeacher: null` 表示清除
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateGradeCommand {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub students: Option<Vec<UserId>>,
    #[serde(default)]
    pub subjects: Option<Vec<SubjectId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub class_teacher: Option<Option<UserId>>,
}

/// 将学生加入班级（幂等）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddStudentCommand {
    pub student_id: UserId,
}
