//! 成绩实体

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use edu_common::{AuditInfo, UserId};
use edu_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{GradeId, MarkId, SubjectId};

/// 分数上限
pub const MAX_MARKS: f64 = 100.0;

/// 考试类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Quiz,
    Midterm,
    Final,
    Assignment,
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Midterm => "midterm",
            Self::Final => "final",
            Self::Assignment => "assignment",
        }
    }
}

impl std::fmt::Display for ExamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExamType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiz" => Ok(Self::Quiz),
            "midterm" => Ok(Self::Midterm),
            "final" => Ok(Self::Final),
            "assignment" => Ok(Self::Assignment),
            _ => Err(AppError::validation("examType", "Invalid exam type")),
        }
    }
}

/// 成绩实体
///
/// (student, subject, exam_type, exam_date) 全局唯一
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub id: MarkId,
    pub student: UserId,
    pub subject: SubjectId,
    pub grade: GradeId,
    /// 录入成绩的主体，创建后不可由调用方指定
    pub teacher: UserId,
    pub marks: f64,
    pub exam_type: ExamType,
    pub exam_date: NaiveDate,
    pub remarks: Option<String>,
    pub audit_info: AuditInfo,
}

impl Mark {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        student: UserId,
        subject: SubjectId,
        grade: GradeId,
        teacher: UserId,
        marks: f64,
        exam_type: ExamType,
        exam_date: NaiveDate,
        remarks: Option<String>,
    ) -> Self {
        Self {
            id: MarkId::new(),
            student,
            subject,
            grade,
            teacher,
            marks,
            exam_type,
            exam_date,
            remarks,
            audit_info: AuditInfo::new(),
        }
    }

    /// 分数必须是 [0, 100] 内的有限数
    pub fn validate_marks(marks: f64) -> AppResult<f64> {
        if !marks.is_finite() || !(0.0..=MAX_MARKS).contains(&marks) {
            return Err(AppError::validation("marks", "Marks must be between 0 and 100"));
        }
        Ok(marks)
    }

    /// 解析 ISO-8601 日期或日期时间，只保留日期部分
    pub fn parse_exam_date(raw: &str) -> AppResult<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.date())
            })
            .ok_or_else(|| AppError::validation("examDate", "Valid exam date is required"))
    }

    /// 备注去除首尾空白，空串视为未设置
    pub fn normalize_remarks(raw: Option<&str>) -> Option<String> {
        raw.map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_range() {
        assert_eq!(Mark::validate_marks(0.0).unwrap(), 0.0);
        assert_eq!(Mark::validate_marks(100.0).unwrap(), 100.0);
        assert!(Mark::validate_marks(100.5).is_err());
        assert!(Mark::validate_marks(-1.0).is_err());
        assert!(Mark::validate_marks(f64::NAN).is_err());
    }

    #[test]
    fn test_exam_type_parse() {
        assert_eq!("midterm".parse::<ExamType>().unwrap(), ExamType::Midterm);
        assert!("oral".parse::<ExamType>().is_err());
    }

    #[test]
    fn test_exam_date_accepts_date_and_datetime() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(Mark::parse_exam_date("2024-03-15").unwrap(), expected);
        assert_eq!(
            Mark::parse_exam_date("2024-03-15T09:30:00.000Z").unwrap(),
            expected
        );
        assert_eq!(
            Mark::parse_exam_date("2024-03-15T09:30:00").unwrap(),
            expected
        );
        assert!(Mark::parse_exam_date("15/03/2024").is_err());
    }
}
