//! PostgreSQL 班级仓储实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edu_adapter_postgres::map_sqlx_error;
use edu_common::{AuditInfo, UserId};
use edu_errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::grade::{Grade, GradePatch, GradeRepository};
use crate::domain::ids::{GradeId, SubjectId};

const GRADE_COLUMNS: &str =
    "id, name, level, section, students, subjects, class_teacher, created_at, updated_at";

pub struct PostgresGradeRepository {
    pool: PgPool,
}

impl PostgresGradeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GradeRepository for PostgresGradeRepository {
    async fn create(&self, grade: &Grade) -> AppResult<()> {
        let students: Vec<Uuid> = grade.students.iter().map(|s| s.0).collect();
        let subjects: Vec<Uuid> = grade.subjects.iter().map(|s| s.0).collect();
        sqlx::query(
            r#"
            INSERT INTO grades (id, name, level, section, students, subjects, class_teacher, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(grade.id.0)
        .bind(&grade.name)
        .bind(grade.level)
        .bind(&grade.section)
        .bind(&students)
        .bind(&subjects)
        .bind(grade.class_teacher.map(|t| t.0))
        .bind(grade.audit_info.created_at)
        .bind(grade.audit_info.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, id: &GradeId, patch: &GradePatch) -> AppResult<Option<Grade>> {
        // 未给出的列保持原值，与并发的 add_student 互不覆盖
        let students: Option<Vec<Uuid>> = patch
            .students
            .as_ref()
            .map(|ids| ids.iter().map(|s| s.0).collect());
        let subjects: Option<Vec<Uuid>> = patch
            .subjects
            .as_ref()
            .map(|ids| ids.iter().map(|s| s.0).collect());
        let row = sqlx::query_as::<_, GradeRow>(&format!(
            "UPDATE grades \
             SET name = COALESCE($2, name), \
                 level = COALESCE($3, level), \
                 section = COALESCE($4, section), \
                 students = COALESCE($5, students), \
                 subjects = COALESCE($6, subjects), \
                 class_teacher = CASE WHEN $7 THEN $8 ELSE class_teacher END, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {GRADE_COLUMNS}"
        ))
        .bind(id.0)
        .bind(patch.name.as_deref())
        .bind(patch.level)
        .bind(patch.section.as_deref())
        .bind(students)
        .bind(subjects)
        .bind(patch.class_teacher.is_some())
        .bind(patch.class_teacher.flatten().map(|t| t.0))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: &GradeId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM grades WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &GradeId) -> AppResult<Option<Grade>> {
        let row = sqlx::query_as::<_, GradeRow>(&format!(
            "SELECT {GRADE_COLUMNS} FROM grades WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[GradeId]) -> AppResult<Vec<Grade>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query_as::<_, GradeRow>(&format!(
            "SELECT {GRADE_COLUMNS} FROM grades WHERE id = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list(&self) -> AppResult<Vec<Grade>> {
        let rows = sqlx::query_as::<_, GradeRow>(&format!(
            "SELECT {GRADE_COLUMNS} FROM grades ORDER BY level ASC, section ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn add_student(&self, id: &GradeId, student: &UserId) -> AppResult<Option<Grade>> {
        // 单条语句完成存在性判断与追加，并发调用不会产生重复项
        let row = sqlx::query_as::<_, GradeRow>(&format!(
            "UPDATE grades \
             SET students = CASE WHEN $2 = ANY(students) THEN students ELSE array_append(students, $2) END, \
                 updated_at = CASE WHEN $2 = ANY(students) THEN updated_at ELSE NOW() END \
             WHERE id = $1 \
             RETURNING {GRADE_COLUMNS}"
        ))
        .bind(id.0)
        .bind(student.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }
}

#[derive(sqlx::FromRow)]
struct GradeRow {
    id: Uuid,
    name: String,
    level: i16,
    section: String,
    students: Vec<Uuid>,
    subjects: Vec<Uuid>,
    class_teacher: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GradeRow> for Grade {
    fn from(row: GradeRow) -> Self {
        Self {
            id: GradeId::from_uuid(row.id),
            name: row.name,
            level: row.level,
            section: row.section,
            students: row.students.into_iter().map(UserId::from_uuid).collect(),
            subjects: row.subjects.into_iter().map(SubjectId::from_uuid).collect(),
            class_teacher: row.class_teacher.map(UserId::from_uuid),
            audit_info: AuditInfo::restore(row.created_at, row.updated_at),
        }
    }
}
