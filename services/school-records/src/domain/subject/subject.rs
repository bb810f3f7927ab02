//! 科目实体

use edu_common::{AuditInfo, UserId, dedup_preserving_order};
use edu_errors::{AppError, AppResult};

use crate::domain::ids::{GradeId, SubjectId};

/// 科目实体
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    /// 大写存储，全局唯一
    pub code: String,
    pub description: Option<String>,
    pub teacher: Option<UserId>,
    pub grades: Vec<GradeId>,
    pub audit_info: AuditInfo,
}

impl Subject {
    pub fn new(
        name: String,
        code: String,
        description: Option<String>,
        teacher: Option<UserId>,
        grades: Vec<GradeId>,
    ) -> Self {
        Self {
            id: SubjectId::new(),
            name,
            code,
            description,
            teacher,
            grades: dedup_preserving_order(&grades),
            audit_info: AuditInfo::new(),
        }
    }

    pub fn validate_name(raw: &str) -> AppResult<String> {
        let name = raw.trim();
        if name.chars().count() < 2 {
            return Err(AppError::validation("name", "Subject name is required"));
        }
        Ok(name.to_string())
    }

    /// 校验科目代码并统一为大写
    pub fn normalize_code(raw: &str) -> AppResult<String> {
        let code = raw.trim();
        if code.chars().count() < 2 {
            return Err(AppError::validation("code", "Subject code is required"));
        }
        Ok(code.to_uppercase())
    }

    /// 可选描述：去除首尾空白，空串视为未设置
    pub fn normalize_description(raw: Option<&str>) -> Option<String> {
        raw.map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }

    /// 加入班级（已存在时不变），返回是否发生变化
    pub fn add_grade(&mut self, grade: GradeId) -> bool {
        if self.grades.contains(&grade) {
            return false;
        }
        self.grades.push(grade);
        self.audit_info.touch();
        true
    }
}

/// 科目的部分更新；`None` 的字段保持原值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectPatch {
    pub name: Option<String>,
    /// 已转为大写
    pub code: Option<String>,
    pub description: Option<Option<String>>,
    pub teacher: Option<Option<UserId>>,
    pub grades: Option<Vec<GradeId>>,
}

impl SubjectPatch {
    pub fn apply(&self, subject: &mut Subject) {
        if let Some(name) = &self.name {
            subject.name = name.clone();
        }
        if let Some(code) = &self.code {
            subject.code = code.clone();
        }
        if let Some(description) = &self.description {
            subject.description = description.clone();
        }
        if let Some(teacher) = self.teacher {
            subject.teacher = teacher;
        }
        if let Some(grades) = &self.grades {
            subject.grades = dedup_preserving_order(grades);
        }
        subject.audit_info.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_uppercased() {
        assert_eq!(Subject::normalize_code(" math101 ").unwrap(), "MATH101");
        assert!(Subject::normalize_code("m").is_err());
    }

    #[test]
    fn test_add_grade_is_idempotent() {
        let mut subject = Subject::new("Mathematics".into(), "MATH101".into(), None, None, vec![]);
        let grade = GradeId::new();
        assert!(subject.add_grade(grade));
        assert!(!subject.add_grade(grade));
        assert_eq!(subject.grades, vec![grade]);
    }

    #[test]
    fn test_blank_description_becomes_none() {
        assert_eq!(Subject::normalize_description(Some("   ")), None);
        assert_eq!(
            Subject::normalize_description(Some(" Algebra ")).as_deref(),
            Some("Algebra")
        );
    }
}
