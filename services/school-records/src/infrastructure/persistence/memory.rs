//! 内存存储
//!
//! 每个写操作在单个写锁内完成唯一性检查与写入，追加引用同样在写锁内完成

use std::collections::HashMap;

use async_trait::async_trait;
use edu_common::UserId;
use edu_errors::{AppError, AppResult};
use tokio::sync::RwLock;

use crate::domain::actor::Role;
use crate::domain::grade::{Grade, GradePatch, GradeRepository};
use crate::domain::ids::{GradeId, MarkId, SubjectId};
use crate::domain::mark::{Mark, MarkFilter, MarkRepository};
use crate::domain::subject::{Subject, SubjectPatch, SubjectRepository};
use crate::domain::user::{User, UserRepository};

/// 内存存储，同时实现四个仓储接口
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    subjects: RwLock<HashMap<SubjectId, Subject>>,
    grades: RwLock<HashMap<GradeId, Grade>>,
    marks: RwLock<HashMap<MarkId, Mark>>,
}

fn collect_by_ids<K, V>(map: &HashMap<K, V>, ids: &[K]) -> Vec<V>
where
    K: std::hash::Hash + Eq,
    V: Clone,
{
    ids.iter().filter_map(|id| map.get(id).cloned()).collect()
}

fn email_taken(users: &HashMap<UserId, User>, user: &User) -> bool {
    users
        .values()
        .any(|u| u.id != user.id && u.email == user.email)
}

fn code_taken(subjects: &HashMap<SubjectId, Subject>, subject: &Subject) -> bool {
    subjects
        .values()
        .any(|s| s.id != subject.id && s.code == subject.code)
}

fn exam_taken(marks: &HashMap<MarkId, Mark>, mark: &Mark) -> bool {
    marks.values().any(|m| {
        m.id != mark.id
            && m.student == mark.student
            && m.subject == mark.subject
            && m.exam_type == mark.exam_type
            && m.exam_date == mark.exam_date
    })
}

fn email_conflict() -> AppError {
    AppError::conflict(["email"], "Duplicate email")
}

fn code_conflict() -> AppError {
    AppError::conflict(["code"], "Duplicate subject code")
}

fn exam_conflict() -> AppError {
    AppError::conflict(
        ["student", "subject", "examType", "examDate"],
        "Duplicate mark for exam",
    )
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if email_taken(&users, user) {
            return Err(email_conflict());
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<bool> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Ok(false);
        }
        if email_taken(&users, user) {
            return Err(email_conflict());
        }
        users.insert(user.id, user.clone());
        Ok(true)
    }

    async fn delete(&self, id: &UserId) -> AppResult<bool> {
        Ok(self.users.write().await.remove(id).is_some())
    }

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        Ok(collect_by_ids(&*self.users.read().await, ids))
    }

    async fn list(&self, role: Option<Role>) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| role.is_none_or(|r| u.role() == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            a.audit_info
                .created_at
                .cmp(&b.audit_info.created_at)
                .then(a.id.cmp(&b.id))
        });
        Ok(users)
    }
}

#[async_trait]
impl SubjectRepository for InMemoryStore {
    async fn create(&self, subject: &Subject) -> AppResult<()> {
        let mut subjects = self.subjects.write().await;
        if code_taken(&subjects, subject) {
            return Err(code_conflict());
        }
        subjects.insert(subject.id, subject.clone());
        Ok(())
    }

    async fn update(&self, id: &SubjectId, patch: &SubjectPatch) -> AppResult<Option<Subject>> {
        let mut subjects = self.subjects.write().await;
        let Some(mut subject) = subjects.get(id).cloned() else {
            return Ok(None);
        };
        patch.apply(&mut subject);
        if code_taken(&subjects, &subject) {
            return Err(code_conflict());
        }
        subjects.insert(subject.id, subject.clone());
        Ok(Some(subject))
    }

    async fn delete(&self, id: &SubjectId) -> AppResult<bool> {
        Ok(self.subjects.write().await.remove(id).is_some())
    }

    async fn find_by_id(&self, id: &SubjectId) -> AppResult<Option<Subject>> {
        Ok(self.subjects.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[SubjectId]) -> AppResult<Vec<Subject>> {
        Ok(collect_by_ids(&*self.subjects.read().await, ids))
    }

    async fn list(&self) -> AppResult<Vec<Subject>> {
        let mut subjects: Vec<Subject> = self.subjects.read().await.values().cloned().collect();
        subjects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(subjects)
    }

    async fn add_grade(&self, id: &SubjectId, grade: &GradeId) -> AppResult<Option<Subject>> {
        let mut subjects = self.subjects.write().await;
        Ok(subjects.get_mut(id).map(|subject| {
            subject.add_grade(*grade);
            subject.clone()
        }))
    }
}

#[async_trait]
impl GradeRepository for InMemoryStore {
    async fn create(&self, grade: &Grade) -> AppResult<()> {
        self.grades.write().await.insert(grade.id, grade.clone());
        Ok(())
    }

    async fn update(&self, id: &GradeId, patch: &GradePatch) -> AppResult<Option<Grade>> {
        let mut grades = self.grades.write().await;
        Ok(grades.get_mut(id).map(|grade| {
            patch.apply(grade);
            grade.clone()
        }))
    }

    async fn delete(&self, id: &GradeId) -> AppResult<bool> {
        Ok(self.grades.write().await.remove(id).is_some())
    }

    async fn find_by_id(&self, id: &GradeId) -> AppResult<Option<Grade>> {
        Ok(self.grades.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[GradeId]) -> AppResult<Vec<Grade>> {
        Ok(collect_by_ids(&*self.grades.read().await, ids))
    }

    async fn list(&self) -> AppResult<Vec<Grade>> {
        let mut grades: Vec<Grade> = self.grades.read().await.values().cloned().collect();
        grades.sort_by(|a, b| {
            a.level
                .cmp(&b.level)
                .then_with(|| a.section.cmp(&b.section))
                .then(a.id.cmp(&b.id))
        });
        Ok(grades)
    }

    async fn add_student(&self, id: &GradeId, student: &UserId) -> AppResult<Option<Grade>> {
        let mut grades = self.grades.write().await;
        Ok(grades.get_mut(id).map(|grade| {
            grade.add_student(*student);
            grade.clone()
        }))
    }
}

#[async_trait]
impl MarkRepository for InMemoryStore {
    async fn create(&self, mark: &Mark) -> AppResult<()> {
        let mut marks = self.marks.write().await;
        if exam_taken(&marks, mark) {
            return Err(exam_conflict());
        }
        marks.insert(mark.id, mark.clone());
        Ok(())
    }

    async fn update(&self, mark: &Mark) -> AppResult<bool> {
        let mut marks = self.marks.write().await;
        if !marks.contains_key(&mark.id) {
            return Ok(false);
        }
        if exam_taken(&marks, mark) {
            return Err(exam_conflict());
        }
        marks.insert(mark.id, mark.clone());
        Ok(true)
    }

    async fn delete(&self, id: &MarkId) -> AppResult<bool> {
        Ok(self.marks.write().await.remove(id).is_some())
    }

    async fn find_by_id(&self, id: &MarkId) -> AppResult<Option<Mark>> {
        Ok(self.marks.read().await.get(id).cloned())
    }

    async fn list(&self, filter: MarkFilter) -> AppResult<Vec<Mark>> {
        let mut marks: Vec<Mark> = self
            .marks
            .read()
            .await
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        marks.sort_by(|a, b| {
            b.exam_date
                .cmp(&a.exam_date)
                .then(b.audit_info.created_at.cmp(&a.audit_info.created_at))
        });
        Ok(marks)
    }
}
