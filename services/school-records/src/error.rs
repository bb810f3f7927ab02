//! 记录服务的领域错误

use chrono::NaiveDate;
use edu_common::UserId;
use edu_errors::AppError;
use thiserror::Error;

use crate::domain::ids::SubjectId;
use crate::domain::mark::ExamType;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("User not found")]
    UserNotFound,

    #[error("Subject not found")]
    SubjectNotFound,

    #[error("Grade not found")]
    GradeNotFound,

    #[error("Mark not found")]
    MarkNotFound,

    #[error("Mark already exists for this student, subject, and exam")]
    MarkAlreadyExists {
        student: UserId,
        subject: SubjectId,
        exam_type: ExamType,
        exam_date: NaiveDate,
    },

    #[error("Subject code already exists")]
    SubjectCodeExists(String),

    #[error("User already exists")]
    EmailAlreadyRegistered(String),
}

impl From<RecordError> for AppError {
    fn from(error: RecordError) -> Self {
        let message = error.to_string();
        match error {
            RecordError::UserNotFound
            | RecordError::SubjectNotFound
            | RecordError::GradeNotFound
            | RecordError::MarkNotFound => AppError::not_found(message),
            RecordError::MarkAlreadyExists { .. } => AppError::conflict(
                ["student", "subject", "examType", "examDate"],
                message,
            ),
            RecordError::SubjectCodeExists(_) => AppError::conflict(["code"], message),
            RecordError::EmailAlreadyRegistered(_) => AppError::conflict(["email"], message),
        }
    }
}

/// 将存储层的唯一性冲突替换为具体的领域错误，其余错误原样返回
pub fn translate_conflict(error: AppError, conflict: impl FnOnce() -> RecordError) -> AppError {
    match error {
        AppError::Conflict { .. } => conflict().into(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_conflict_names_the_tuple() {
        let err: AppError = RecordError::MarkAlreadyExists {
            student: UserId::new(),
            subject: SubjectId::new(),
            exam_type: ExamType::Final,
            exam_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
        .into();

        assert_eq!(err.status_code(), 400);
        match err {
            AppError::Conflict { fields, message } => {
                assert_eq!(fields, vec!["student", "subject", "examType", "examDate"]);
                assert_eq!(message, "Mark already exists for this student, subject, and exam");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_translate_conflict_keeps_other_errors() {
        let err = translate_conflict(AppError::database("boom"), || {
            RecordError::SubjectCodeExists("MATH".into())
        });
        assert!(matches!(err, AppError::Database(_)));

        let err = translate_conflict(AppError::conflict(["subjects_code_key"], "dup"), || {
            RecordError::SubjectCodeExists("MATH".into())
        });
        match err {
            AppError::Conflict { fields, .. } => assert_eq!(fields, vec!["code"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
