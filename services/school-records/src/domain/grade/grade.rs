//! 班级实体（班级/分班，不是分数）

use edu_common::{AuditInfo, UserId, dedup_preserving_order};
use edu_errors::{AppError, AppResult};

use crate::domain::ids::{GradeId, SubjectId};

/// 年级范围
pub const MIN_LEVEL: i64 = 1;
pub const MAX_LEVEL: i64 = 12;

/// 班级实体
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub id: GradeId,
    pub name: String,
    pub level: i16,
    pub section: String,
    pub students: Vec<UserId>,
    pub subjects: Vec<SubjectId>,
    pub class_teacher: Option<UserId>,
    pub audit_info: AuditInfo,
}

impl Grade {
    pub fn new(
        name: String,
        level: i16,
        section: String,
        students: Vec<UserId>,
        subjects: Vec<SubjectId>,
        class_teacher: Option<UserId>,
    ) -> Self {
        Self {
            id: GradeId::new(),
            name,
            level,
            section,
            students: dedup_preserving_order(&students),
            subjects: dedup_preserving_order(&subjects),
            class_teacher,
            audit_info: AuditInfo::new(),
        }
    }

    pub fn validate_name(raw: &str) -> AppResult<String> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(AppError::validation("name", "Grade name is required"));
        }
        Ok(name.to_string())
    }

    pub fn validate_section(raw: &str) -> AppResult<String> {
        let section = raw.trim();
        if section.is_empty() {
            return Err(AppError::validation("section", "Section is required"));
        }
        Ok(section.to_string())
    }

    pub fn validate_level(level: i64) -> AppResult<i16> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(AppError::validation("level", "Level must be between 1 and 12"));
        }
        // 范围已校验
        Ok(level as i16)
    }

    /// 加入学生（已存在时不变），返回是否发生变化
    pub fn add_student(&mut self, student: UserId) -> bool {
        if self.students.contains(&student) {
            return false;
        }
        self.students.push(student);
        self.audit_info.touch();
        true
    }
}

/// 班级的部分更新，值均已校验；`None` 的字段保持原值
///
/// 存储层在一次原子写入中应用，未给出的列不会被覆盖
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradePatch {
    pub name: Option<String>,
    pub level: Option<i16>,
    pub section: Option<String>,
    pub students: Option<Vec<UserId>>,
    pub subjects: Option<Vec<SubjectId>>,
    /// `Some(None)` 清除班主任
    pub class_teacher: Option<Option<UserId>>,
}

impl GradePatch {
    pub fn apply(&self, grade: &mut Grade) {
        if let Some(name) = &self.name {
            grade.name = name.clone();
        }
        if let Some(level) = self.level {
            grade.level = level;
        }
        if let Some(section) = &self.section {
            grade.section = section.clone();
        }
        if let Some(students) = &self.students {
            grade.students = dedup_preserving_order(students);
        }
        if let Some(subjects) = &self.subjects {
            grade.subjects = dedup_preserving_order(subjects);
        }
        if let Some(class_teacher) = self.class_teacher {
            grade.class_teacher = class_teacher;
        }
        grade.audit_info.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bounds() {
        assert_eq!(Grade::validate_level(1).unwrap(), 1);
        assert_eq!(Grade::validate_level(12).unwrap(), 12);
        assert!(Grade::validate_level(0).is_err());
        assert!(Grade::validate_level(13).is_err());
    }

    #[test]
    fn test_add_student_once() {
        let mut grade = Grade::new("Grade 5".into(), 5, "A".into(), vec![], vec![], None);
        let student = UserId::new();
        assert!(grade.add_student(student));
        assert!(!grade.add_student(student));
        assert_eq!(grade.students.len(), 1);
    }

    #[test]
    fn test_patch_leaves_roster_untouched() {
        let mut grade = Grade::new("Grade 5".into(), 5, "A".into(), vec![], vec![], None);
        let student = UserId::new();
        grade.add_student(student);
        let patch = GradePatch {
            name: Some("Grade 5 Blue".into()),
            class_teacher: Some(None),
            ..Default::default()
        };
        patch.apply(&mut grade);
        assert_eq!(grade.name, "Grade 5 Blue");
        assert_eq!(grade.students, vec![student]);
        assert_eq!(grade.class_teacher, None);
    }

    #[test]
    fn test_blank_section_rejected() {
        assert!(matches!(
            Grade::validate_section("  "),
            Err(AppError::Validation { .. })
        ));
    }
}
