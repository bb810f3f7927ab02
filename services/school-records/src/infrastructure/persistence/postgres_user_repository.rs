//! PostgreSQL 用户仓储实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edu_adapter_postgres::map_sqlx_error;
use edu_common::{AuditInfo, UserId};
use edu_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::actor::Role;
use crate::domain::ids::{GradeId, SubjectId};
use crate::domain::user::{HashedPassword, RoleProfile, User, UserRepository};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, student_id, teacher_id, \
     enrolled_grade, assigned_subjects, assigned_grades, created_at, updated_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 角色资料拆成列
struct ProfileColumns<'a> {
    student_id: Option<&'a str>,
    teacher_id: Option<&'a str>,
    enrolled_grade: Option<Uuid>,
    assigned_subjects: Vec<Uuid>,
    assigned_grades: Vec<Uuid>,
}

impl<'a> From<&'a RoleProfile> for ProfileColumns<'a> {
    fn from(profile: &'a RoleProfile) -> Self {
        match profile {
            RoleProfile::Admin => Self {
                student_id: None,
                teacher_id: None,
                enrolled_grade: None,
                assigned_subjects: Vec::new(),
                assigned_grades: Vec::new(),
            },
            RoleProfile::Teacher {
                teacher_id,
                assigned_subjects,
                assigned_grades,
            } => Self {
                student_id: None,
                teacher_id: Some(teacher_id),
                enrolled_grade: None,
                assigned_subjects: assigned_subjects.iter().map(|s| s.0).collect(),
                assigned_grades: assigned_grades.iter().map(|g| g.0).collect(),
            },
            RoleProfile::Student {
                student_id,
                enrolled_grade,
            } => Self {
                student_id: Some(student_id),
                teacher_id: None,
                enrolled_grade: enrolled_grade.map(|g| g.0),
                assigned_subjects: Vec::new(),
                assigned_grades: Vec::new(),
            },
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> AppResult<()> {
        let cols = ProfileColumns::from(&user.profile);
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, student_id, teacher_id,
                               enrolled_grade, assigned_subjects, assigned_grades, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id.0)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password.as_str())
        .bind(user.role().as_str())
        .bind(cols.student_id)
        .bind(cols.teacher_id)
        .bind(cols.enrolled_grade)
        .bind(&cols.assigned_subjects)
        .bind(&cols.assigned_grades)
        .bind(user.audit_info.created_at)
        .bind(user.audit_info.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<bool> {
        let cols = ProfileColumns::from(&user.profile);
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, role = $5, student_id = $6,
                teacher_id = $7, enrolled_grade = $8, assigned_subjects = $9,
                assigned_grades = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password.as_str())
        .bind(user.role().as_str())
        .bind(cols.student_id)
        .bind(cols.teacher_id)
        .bind(cols.enrolled_grade)
        .bind(&cols.assigned_subjects)
        .bind(&cols.assigned_grades)
        .bind(user.audit_info.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn list(&self, role: Option<Role>) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::text IS NULL OR role = $1) \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(UserRow::into_user).collect()
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    student_id: Option<String>,
    teacher_id: Option<String>,
    enrolled_grade: Option<Uuid>,
    assigned_subjects: Vec<Uuid>,
    assigned_grades: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AppResult<User> {
        let role: Role = self
            .role
            .parse()
            .map_err(|_| AppError::database(format!("Unknown role '{}' for user {}", self.role, self.id)))?;

        let profile = match role {
            Role::Admin => RoleProfile::Admin,
            Role::Teacher => RoleProfile::Teacher {
                teacher_id: self.teacher_id.unwrap_or_default(),
                assigned_subjects: self.assigned_subjects.into_iter().map(SubjectId::from_uuid).collect(),
                assigned_grades: self.assigned_grades.into_iter().map(GradeId::from_uuid).collect(),
            },
            Role::Student => RoleProfile::Student {
                student_id: self.student_id.unwrap_or_default(),
                enrolled_grade: self.enrolled_grade.map(GradeId::from_uuid),
            },
        };

        Ok(User {
            id: UserId::from_uuid(self.id),
            name: self.name,
            email: self.email,
            password: HashedPassword::from_hash(self.password_hash),
            profile,
            audit_info: AuditInfo::restore(self.created_at, self.updated_at),
        })
    }
}
