//! 输出视图：引用字段解析为内嵌摘要，密码从不输出

use chrono::{DateTime, NaiveDate, Utc};
use edu_common::UserId;
use serde::Serialize;

use super::references::References;
use crate::domain::actor::Role;
use crate::domain::grade::Grade;
use crate::domain::ids::{GradeId, MarkId, SubjectId};
use crate::domain::mark::{ExamType, Mark};
use crate::domain::subject::Subject;
use crate::domain::user::{RoleProfile, User};

/// 用户摘要；学生引用带学号，教师引用不带
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
}

impl UserSummary {
    pub fn student(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            student_id: user.profile.student_id().map(str::to_string),
        }
    }

    pub fn teacher(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            student_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub id: SubjectId,
    pub name: String,
    pub code: String,
}

impl From<&Subject> for SubjectSummary {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name.clone(),
            code: subject.code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub id: GradeId,
    pub name: String,
    pub level: i16,
    pub section: String,
}

impl From<&Grade> for GradeSummary {
    fn from(grade: &Grade) -> Self {
        Self {
            id: grade.id,
            name: grade.name.clone(),
            level: grade.level,
            section: grade.section.clone(),
        }
    }
}

fn subjects_of(refs: &References, ids: &[SubjectId]) -> Vec<SubjectSummary> {
    ids.iter()
        .filter_map(|id| refs.subject(id))
        .map(SubjectSummary::from)
        .collect()
}

fn grades_of(refs: &References, ids: &[GradeId]) -> Vec<GradeSummary> {
    ids.iter()
        .filter_map(|id| refs.grade(id))
        .map(GradeSummary::from)
        .collect()
}

/// 用户视图
///
/// 角色专属字段只在对应角色下出现；学生的 `enrolledGrade` 未设置时为 null
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrolled_grade: Option<Option<GradeSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_subjects: Option<Vec<SubjectSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_grades: Option<Vec<GradeSummary>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserView {
    pub fn build(user: &User, refs: &References) -> Self {
        let mut view = Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role(),
            student_id: None,
            teacher_id: None,
            enrolled_grade: None,
            assigned_subjects: None,
            assigned_grades: None,
            created_at: user.audit_info.created_at,
            updated_at: user.audit_info.updated_at,
        };

        match &user.profile {
            RoleProfile::Admin => {}
            RoleProfile::Student {
                student_id,
                enrolled_grade,
            } => {
                view.student_id = Some(student_id.clone());
                view.enrolled_grade = Some(
                    enrolled_grade
                        .and_then(|id| refs.grade(&id))
                        .map(GradeSummary::from),
                );
            }
            RoleProfile::Teacher {
                teacher_id,
                assigned_subjects,
                assigned_grades,
            } => {
                view.teacher_id = Some(teacher_id.clone());
                view.assigned_subjects = Some(subjects_of(refs, assigned_subjects));
                view.assigned_grades = Some(grades_of(refs, assigned_grades));
            }
        }

        view
    }
}

/// 科目视图
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectView {
    pub id: SubjectId,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub teacher: Option<UserSummary>,
    pub grades: Vec<GradeSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubjectView {
    pub fn build(subject: &Subject, refs: &References) -> Self {
        Self {
            id: subject.id,
            name: subject.name.clone(),
            code: subject.code.clone(),
            description: subject.description.clone(),
            teacher: subject
                .teacher
                .and_then(|id| refs.user(&id))
                .map(UserSummary::teacher),
            grades: grades_of(refs, &subject.grades),
            created_at: subject.audit_info.created_at,
            updated_at: subject.audit_info.updated_at,
        }
    }
}

/// 班级视图
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeView {
    pub id: GradeId,
    pub name: String,
    pub level: i16,
    pub section: String,
    pub students: Vec<UserSummary>,
    pub subjects: Vec<SubjectSummary>,
    pub class_teacher: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GradeView {
    pub fn build(grade: &Grade, refs: &References) -> Self {
        Self {
            id: grade.id,
            name: grade.name.clone(),
            level: grade.level,
            section: grade.section.clone(),
            students: grade
                .students
                .iter()
                .filter_map(|id| refs.user(id))
                .map(UserSummary::student)
                .collect(),
            subjects: subjects_of(refs, &grade.subjects),
            class_teacher: grade
                .class_teacher
                .and_then(|id| refs.user(&id))
                .map(UserSummary::teacher),
            created_at: grade.audit_info.created_at,
            updated_at: grade.audit_info.updated_at,
        }
    }
}

/// 成绩视图
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkView {
    pub id: MarkId,
    pub student: Option<UserSummary>,
    pub subject: Option<SubjectSummary>,
    pub grade: Option<GradeSummary>,
    pub teacher: Option<UserSummary>,
    pub marks: f64,
    pub exam_type: ExamType,
    pub exam_date: NaiveDate,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarkView {
    pub fn build(mark: &Mark, refs: &References) -> Self {
        Self {
            id: mark.id,
            student: refs.user(&mark.student).map(UserSummary::student),
            subject: refs.subject(&mark.subject).map(SubjectSummary::from),
            grade: refs.grade(&mark.grade).map(GradeSummary::from),
            teacher: refs.user(&mark.teacher).map(UserSummary::teacher),
            marks: mark.marks,
            exam_type: mark.exam_type,
            exam_date: mark.exam_date,
            remarks: mark.remarks.clone(),
            created_at: mark.audit_info.created_at,
            updated_at: mark.audit_info.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::HashedPassword;

    #[test]
    fn test_dangling_references_resolve_to_null() {
        let mark = Mark::new(
            UserId::new(),
            SubjectId::new(),
            GradeId::new(),
            UserId::new(),
            72.5,
            ExamType::Quiz,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            None,
        );

        let view = MarkView::build(&mark, &References::default());
        assert!(view.student.is_none());
        assert!(view.subject.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["student"].is_null());
        assert_eq!(json["examType"], "quiz");
        assert_eq!(json["examDate"], "2024-01-10");
    }

    #[test]
    fn test_user_view_hides_password_and_foreign_role_fields() {
        let user = User::new(
            "Teacher Tom".into(),
            "tom@school.org".into(),
            HashedPassword::from_hash("$argon2id$placeholder".into()),
            RoleProfile::teacher(Some("T-1"), vec![SubjectId::new()], vec![]).unwrap(),
        );

        let json = serde_json::to_value(UserView::build(&user, &References::default())).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("studentId").is_none());
        assert!(json.get("enrolledGrade").is_none());
        assert_eq!(json["teacherId"], "T-1");
        assert_eq!(json["role"], "teacher");
        // 已删除的科目从列表中省略
        assert_eq!(json["assignedSubjects"], serde_json::json!([]));
    }

    #[test]
    fn test_student_without_grade_serializes_null() {
        let user = User::new(
            "Sam".into(),
            "sam@school.org".into(),
            HashedPassword::from_hash("x".into()),
            RoleProfile::student(Some("S-7"), None).unwrap(),
        );
        let json = serde_json::to_value(UserView::build(&user, &References::default())).unwrap();
        assert!(json["enrolledGrade"].is_null());
        assert!(json.as_object().unwrap().contains_key("enrolledGrade"));
    }
}
