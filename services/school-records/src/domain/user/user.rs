//! 用户实体

use edu_common::{AuditInfo, UserId};
use edu_errors::{AppError, AppResult};
use email_address::EmailAddress;

use super::password::HashedPassword;
use crate::domain::actor::Role;
use crate::domain::ids::{GradeId, SubjectId};

/// 用户名最小长度
pub const MIN_USER_NAME_LEN: usize = 2;

/// 按角色区分的用户资料
///
/// 学生与教师的专属字段互斥，管理员没有专属字段
#[derive(Debug, Clone, PartialEq)]
pub enum RoleProfile {
    Admin,
    Teacher {
        teacher_id: String,
        assigned_subjects: Vec<SubjectId>,
        assigned_grades: Vec<GradeId>,
    },
    Student {
        student_id: String,
        enrolled_grade: Option<GradeId>,
    },
}

impl RoleProfile {
    /// 创建教师资料，教师编号必填
    pub fn teacher(
        teacher_id: Option<&str>,
        assigned_subjects: Vec<SubjectId>,
        assigned_grades: Vec<GradeId>,
    ) -> AppResult<Self> {
        let teacher_id = required_identifier(teacher_id, "teacherId", "Teacher ID is required")?;
        Ok(Self::Teacher {
            teacher_id,
            assigned_subjects: edu_common::dedup_preserving_order(&assigned_subjects),
            assigned_grades: edu_common::dedup_preserving_order(&assigned_grades),
        })
    }

    /// 创建学生资料，学号必填
    pub fn student(student_id: Option<&str>, enrolled_grade: Option<GradeId>) -> AppResult<Self> {
        let student_id = required_identifier(student_id, "studentId", "Student ID is required")?;
        Ok(Self::Student {
            student_id,
            enrolled_grade,
        })
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Admin => Role::Admin,
            Self::Teacher { .. } => Role::Teacher,
            Self::Student { .. } => Role::Student,
        }
    }

    pub fn student_id(&self) -> Option<&str> {
        match self {
            Self::Student { student_id, .. } => Some(student_id),
            _ => None,
        }
    }

    pub fn teacher_id(&self) -> Option<&str> {
        match self {
            Self::Teacher { teacher_id, .. } => Some(teacher_id),
            _ => None,
        }
    }
}

fn required_identifier(raw: Option<&str>, field: &str, reason: &str) -> AppResult<String> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(AppError::validation(field, reason)),
    }
}

/// 用户实体
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// 小写存储，全局唯一
    pub email: String,
    pub password: HashedPassword,
    pub profile: RoleProfile,
    pub audit_info: AuditInfo,
}

impl User {
    pub fn new(name: String, email: String, password: HashedPassword, profile: RoleProfile) -> Self {
        Self {
            id: UserId::new(),
            name,
            email,
            password,
            profile,
            audit_info: AuditInfo::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn is_student(&self) -> bool {
        self.role() == Role::Student
    }

    pub fn is_teacher(&self) -> bool {
        self.role() == Role::Teacher
    }

    /// 校验并规整用户名
    pub fn validate_name(raw: &str) -> AppResult<String> {
        let name = raw.trim();
        if name.chars().count() < MIN_USER_NAME_LEN {
            return Err(AppError::validation(
                "name",
                "Name must be at least 2 characters",
            ));
        }
        Ok(name.to_string())
    }

    /// 校验邮箱格式并转为小写
    pub fn normalize_email(raw: &str) -> AppResult<String> {
        let email = raw.trim().to_lowercase();
        if !EmailAddress::is_valid(&email) {
            return Err(AppError::validation("email", "Please enter a valid email"));
        }
        Ok(email)
    }

    /// 资料中引用的科目
    pub fn subject_refs(&self) -> &[SubjectId] {
        match &self.profile {
            RoleProfile::Teacher {
                assigned_subjects, ..
            } => assigned_subjects,
            _ => &[],
        }
    }

    /// 资料中引用的班级
    pub fn grade_refs(&self) -> Vec<GradeId> {
        match &self.profile {
            RoleProfile::Teacher {
                assigned_grades, ..
            } => assigned_grades.clone(),
            RoleProfile::Student {
                enrolled_grade: Some(grade),
                ..
            } => vec![*grade],
            _ => Vec::new(),
        }
    }
}
