//! 科目命令

use edu_common::UserId;
use serde::Deserialize;

use crate::application::patch::double_option;
use crate::domain::ids::GradeId;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSubjectCommand {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub teacher: Option<UserId>,
    #[serde(default)]
    pub grades: Vec<GradeId>,
}

/// 部分更新；`description` 与 `teacher` 可显式置 null 清除
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSubjectCommand {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub teacher: Option<Option<UserId>>,
    #[serde(default)]
    pub grades: Option<Vec<GradeId>>,
}

/// 将班级加入科目（幂等）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddGradeCommand {
    pub grade_id: GradeId,
}
