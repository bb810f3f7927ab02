//! 引用字段的存在性校验与批量解析

use std::collections::HashMap;

use edu_common::{UserId, dedup_preserving_order};
use edu_errors::{AppError, AppResult};

use super::Repositories;
use crate::domain::actor::Role;
use crate::domain::grade::Grade;
use crate::domain::ids::{GradeId, SubjectId};
use crate::domain::subject::Subject;
use crate::domain::user::User;

/// 校验单个用户引用存在且角色匹配
pub async fn ensure_user(
    repos: &Repositories,
    id: &UserId,
    role: Role,
    field: &str,
) -> AppResult<User> {
    match repos.users.find_by_id(id).await? {
        Some(user) if user.role() == role => Ok(user),
        _ => Err(AppError::validation(
            field,
            format!("Valid {} ID is required", role),
        )),
    }
}

/// 校验一组用户引用全部存在且角色匹配
pub async fn ensure_users(
    repos: &Repositories,
    ids: &[UserId],
    role: Role,
    field: &str,
) -> AppResult<()> {
    let ids = dedup_preserving_order(ids);
    if ids.is_empty() {
        return Ok(());
    }
    let found = repos.users.find_by_ids(&ids).await?;
    if found.len() != ids.len() || found.iter().any(|u| u.role() != role) {
        return Err(AppError::validation(
            field,
            format!("Every entry must be a valid {} ID", role),
        ));
    }
    Ok(())
}

pub async fn ensure_subject(repos: &Repositories, id: &SubjectId, field: &str) -> AppResult<Subject> {
    repos
        .subjects
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::validation(field, "Valid subject ID is required"))
}

pub async fn ensure_subjects(repos: &Repositories, ids: &[SubjectId], field: &str) -> AppResult<()> {
    let ids = dedup_preserving_order(ids);
    if ids.is_empty() {
        return Ok(());
    }
    if repos.subjects.find_by_ids(&ids).await?.len() != ids.len() {
        return Err(AppError::validation(field, "Every entry must be a valid subject ID"));
    }
    Ok(())
}

pub async fn ensure_grade(repos: &Repositories, id: &GradeId, field: &str) -> AppResult<Grade> {
    repos
        .grades
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::validation(field, "Valid grade ID is required"))
}

pub async fn ensure_grades(repos: &Repositories, ids: &[GradeId], field: &str) -> AppResult<()> {
    let ids = dedup_preserving_order(ids);
    if ids.is_empty() {
        return Ok(());
    }
    if repos.grades.find_by_ids(&ids).await?.len() != ids.len() {
        return Err(AppError::validation(field, "Every entry must be a valid grade ID"));
    }
    Ok(())
}

/// 批量解析后的引用记录
///
/// 只读；缺失的引用（记录已被删除）在查询时返回 None
#[derive(Debug, Default)]
pub struct References {
    users: HashMap<UserId, User>,
    subjects: HashMap<SubjectId, Subject>,
    grades: HashMap<GradeId, Grade>,
}

impl References {
    pub async fn load(
        repos: &Repositories,
        user_ids: &[UserId],
        subject_ids: &[SubjectId],
        grade_ids: &[GradeId],
    ) -> AppResult<Self> {
        let mut refs = Self::default();

        let user_ids = dedup_preserving_order(user_ids);
        if !user_ids.is_empty() {
            refs.users = repos
                .users
                .find_by_ids(&user_ids)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect();
        }

        let subject_ids = dedup_preserving_order(subject_ids);
        if !subject_ids.is_empty() {
            refs.subjects = repos
                .subjects
                .find_by_ids(&subject_ids)
                .await?
                .into_iter()
                .map(|s| (s.id, s))
                .collect();
        }

        let grade_ids = dedup_preserving_order(grade_ids);
        if !grade_ids.is_empty() {
            refs.grades = repos
                .grades
                .find_by_ids(&grade_ids)
                .await?
                .into_iter()
                .map(|g| (g.id, g))
                .collect();
        }

        Ok(refs)
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.get(id)
    }

    pub fn grade(&self, id: &GradeId) -> Option<&Grade> {
        self.grades.get(id)
    }
}
