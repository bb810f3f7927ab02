//! PostgreSQL 成绩仓储实现

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use edu_adapter_postgres::map_sqlx_error;
use edu_common::{AuditInfo, UserId};
use edu_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::ids::{GradeId, MarkId, SubjectId};
use crate::domain::mark::{ExamType, Mark, MarkFilter, MarkRepository};

const MARK_COLUMNS: &str = "id, student_id, subject_id, grade_id, teacher_id, marks, exam_type, \
     exam_date, remarks, created_at, updated_at";

pub struct PostgresMarkRepository {
    pool: PgPool,
}

impl PostgresMarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarkRepository for PostgresMarkRepository {
    async fn create(&self, mark: &Mark) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO marks (id, student_id, subject_id, grade_id, teacher_id, marks,
                               exam_type, exam_date, remarks, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(mark.id.0)
        .bind(mark.student.0)
        .bind(mark.subject.0)
        .bind(mark.grade.0)
        .bind(mark.teacher.0)
        .bind(mark.marks)
        .bind(mark.exam_type.as_str())
        .bind(mark.exam_date)
        .bind(&mark.remarks)
        .bind(mark.audit_info.created_at)
        .bind(mark.audit_info.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, mark: &Mark) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE marks
            SET student_id = $2, subject_id = $3, grade_id = $4, marks = $5,
                exam_type = $6, exam_date = $7, remarks = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(mark.id.0)
        .bind(mark.student.0)
        .bind(mark.subject.0)
        .bind(mark.grade.0)
        .bind(mark.marks)
        .bind(mark.exam_type.as_str())
        .bind(mark.exam_date)
        .bind(&mark.remarks)
        .bind(mark.audit_info.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &MarkId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM marks WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &MarkId) -> AppResult<Option<Mark>> {
        let row = sqlx::query_as::<_, MarkRow>(&format!(
            "SELECT {MARK_COLUMNS} FROM marks WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(MarkRow::into_mark).transpose()
    }

    async fn list(&self, filter: MarkFilter) -> AppResult<Vec<Mark>> {
        let rows = sqlx::query_as::<_, MarkRow>(&format!(
            "SELECT {MARK_COLUMNS} FROM marks \
             WHERE ($1::uuid IS NULL OR student_id = $1) \
               AND ($2::uuid IS NULL OR teacher_id = $2) \
             ORDER BY exam_date DESC, created_at DESC, id DESC"
        ))
        .bind(filter.student.map(|s| s.0))
        .bind(filter.teacher.map(|t| t.0))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(MarkRow::into_mark).collect()
    }
}

#[derive(sqlx::FromRow)]
struct MarkRow {
    id: Uuid,
    student_id: Uuid,
    subject_id: Uuid,
    grade_id: Uuid,
    teacher_id: Uuid,
    marks: f64,
    exam_type: String,
    exam_date: NaiveDate,
    remarks: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MarkRow {
    fn into_mark(self) -> AppResult<Mark> {
        let exam_type: ExamType = self.exam_type.parse().map_err(|_| {
            AppError::database(format!(
                "Unknown exam type '{}' for mark {}",
                self.exam_type, self.id
            ))
        })?;

        Ok(Mark {
            id: MarkId::from_uuid(self.id),
            student: UserId::from_uuid(self.student_id),
            subject: SubjectId::from_uuid(self.subject_id),
            grade: GradeId::from_uuid(self.grade_id),
            teacher: UserId::from_uuid(self.teacher_id),
            marks: self.marks,
            exam_type,
            exam_date: self.exam_date,
            remarks: self.remarks,
            audit_info: AuditInfo::restore(self.created_at, self.updated_at),
        })
    }
}
