//! 成绩命令

use edu_common::UserId;
use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::application::patch::double_option;
use crate::domain::ids::{GradeId, SubjectId};

/// 录入成绩
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateMarkCommand {
    pub student: UserId,
    pub subject: SubjectId,
    pub grade: GradeId,
    pub marks: f64,
    pub exam_type: String,
    pub exam_date: String,
    #[serde(default)]
    pub remarks: Option<String>,
    /// 接受但忽略：成绩的教师始终是录入者本人
    #[serde(default)]
    pub teacher: Option<IgnoredAny>,
}

/// 部分更新；`remarks: null` 表示清除
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateMarkCommand {
    #[serde(default)]
    pub student: Option<UserId>,
    #[serde(default)]
    pub subject: Option<SubjectId>,
    #[serde(default)]
    pub grade: Option<GradeId>,
    #[serde(default)]
    pub marks: Option<f64>,
    #[serde(default)]
    pub exam_type: Option<String>,
    #[serde(default)]
    pub exam_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub remarks: Option<Option<String>>,
}
