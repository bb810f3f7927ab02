//! PostgreSQL 科目仓储实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edu_adapter_postgres::map_sqlx_error;
use edu_common::{AuditInfo, UserId};
use edu_errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::ids::{GradeId, SubjectId};
use crate::domain::subject::{Subject, SubjectPatch, SubjectRepository};

const SUBJECT_COLUMNS: &str =
    "id, name, code, description, teacher_id, grades, created_at, updated_at";

pub struct PostgresSubjectRepository {
    pool: PgPool,
}

impl PostgresSubjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubjectRepository for PostgresSubjectRepository {
    async fn create(&self, subject: &Subject) -> AppResult<()> {
        let grades: Vec<Uuid> = subject.grades.iter().map(|g| g.0).collect();
        sqlx::query(
            r#"
            INSERT INTO subjects (id, name, code, description, teacher_id, grades, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(subject.id.0)
        .bind(&subject.name)
        .bind(&subject.code)
        .bind(&subject.description)
        .bind(subject.teacher.map(|t| t.0))
        .bind(&grades)
        .bind(subject.audit_info.created_at)
        .bind(subject.audit_info.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, id: &SubjectId, patch: &SubjectPatch) -> AppResult<Option<Subject>> {
        let grades: Option<Vec<Uuid>> = patch
            .grades
            .as_ref()
            .map(|ids| ids.iter().map(|g| g.0).collect());
        let row = sqlx::query_as::<_, SubjectRow>(&format!(
            "UPDATE subjects \
             SET name = COALESCE($2, name), \
                 code = COALESCE($3, code), \
                 description = CASE WHEN $4 THEN $5 ELSE description END, \
                 teacher_id = CASE WHEN $6 THEN $7 ELSE teacher_id END, \
                 grades = COALESCE($8, grades), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {SUBJECT_COLUMNS}"
        ))
        .bind(id.0)
        .bind(patch.name.as_deref())
        .bind(patch.code.as_deref())
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.teacher.is_some())
        .bind(patch.teacher.flatten().map(|t| t.0))
        .bind(grades)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: &SubjectId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &SubjectId) -> AppResult<Option<Subject>> {
        let row = sqlx::query_as::<_, SubjectRow>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[SubjectId]) -> AppResult<Vec<Subject>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query_as::<_, SubjectRow>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list(&self) -> AppResult<Vec<Subject>> {
        let rows = sqlx::query_as::<_, SubjectRow>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY name ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn add_grade(&self, id: &SubjectId, grade: &GradeId) -> AppResult<Option<Subject>> {
        // 单条语句完成存在性判断与追加
        let row = sqlx::query_as::<_, SubjectRow>(&format!(
            "UPDATE subjects \
             SET grades = CASE WHEN $2 = ANY(grades) THEN grades ELSE array_append(grades, $2) END, \
                 updated_at = CASE WHEN $2 = ANY(grades) THEN updated_at ELSE NOW() END \
             WHERE id = $1 \
             RETURNING {SUBJECT_COLUMNS}"
        ))
        .bind(id.0)
        .bind(grade.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }
}

#[derive(sqlx::FromRow)]
struct SubjectRow {
    id: Uuid,
    name: String,
    code: String,
    description: Option<String>,
    teacher_id: Option<Uuid>,
    grades: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SubjectRow> for Subject {
    fn from(row: SubjectRow) -> Self {
        Self {
            id: SubjectId::from_uuid(row.id),
            name: row.name,
            code: row.code,
            description: row.description,
            teacher: row.teacher_id.map(UserId::from_uuid),
            grades: row.grades.into_iter().map(GradeId::from_uuid).collect(),
            audit_info: AuditInfo::restore(row.created_at, row.updated_at),
        }
    }
}
