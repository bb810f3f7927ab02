//! 并发写入：唯一性与幂等加入由存储层保证

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{Fixture, command};
use edu_common::UserId;
use edu_errors::{AppError, AppResult};
use futures::future::join_all;
use school_records::Repositories;
use school_records::application::grade::AddStudentCommand;
use school_records::application::subject::AddGradeCommand;
use school_records::domain::grade::{Grade, GradePatch, GradeRepository};
use school_records::domain::subject::{Subject, SubjectPatch, SubjectRepository};
use school_records::domain::{GradeId, SubjectId};
use school_records::infrastructure::persistence::InMemoryStore;
use serde_json::json;

/// 单条读取较慢的存储，用来拉开更新请求的读与写
struct SlowReads(Arc<InMemoryStore>);

const READ_DELAY: Duration = Duration::from_millis(50);

#[async_trait]
impl GradeRepository for SlowReads {
    async fn create(&self, grade: &Grade) -> AppResult<()> {
        GradeRepository::create(&*self.0, grade).await
    }

    async fn update(&self, id: &GradeId, patch: &GradePatch) -> AppResult<Option<Grade>> {
        GradeRepository::update(&*self.0, id, patch).await
    }

    async fn delete(&self, id: &GradeId) -> AppResult<bool> {
        GradeRepository::delete(&*self.0, id).await
    }

    async fn find_by_id(&self, id: &GradeId) -> AppResult<Option<Grade>> {
        tokio::time::sleep(READ_DELAY).await;
        GradeRepository::find_by_id(&*self.0, id).await
    }

    async fn find_by_ids(&self, ids: &[GradeId]) -> AppResult<Vec<Grade>> {
        GradeRepository::find_by_ids(&*self.0, ids).await
    }

    async fn list(&self) -> AppResult<Vec<Grade>> {
        GradeRepository::list(&*self.0).await
    }

    async fn add_student(&self, id: &GradeId, student: &UserId) -> AppResult<Option<Grade>> {
        GradeRepository::add_student(&*self.0, id, student).await
    }
}

#[async_trait]
impl SubjectRepository for SlowReads {
    async fn create(&self, subject: &Subject) -> AppResult<()> {
        SubjectRepository::create(&*self.0, subject).await
    }

    async fn update(&self, id: &SubjectId, patch: &SubjectPatch) -> AppResult<Option<Subject>> {
        SubjectRepository::update(&*self.0, id, patch).await
    }

    async fn delete(&self, id: &SubjectId) -> AppResult<bool> {
        SubjectRepository::delete(&*self.0, id).await
    }

    async fn find_by_id(&self, id: &SubjectId) -> AppResult<Option<Subject>> {
        tokio::time::sleep(READ_DELAY).await;
        SubjectRepository::find_by_id(&*self.0, id).await
    }

    async fn find_by_ids(&self, ids: &[SubjectId]) -> AppResult<Vec<Subject>> {
        SubjectRepository::find_by_ids(&*self.0, ids).await
    }

    async fn list(&self) -> AppResult<Vec<Subject>> {
        SubjectRepository::list(&*self.0).await
    }

    async fn add_grade(&self, id: &SubjectId, grade: &GradeId) -> AppResult<Option<Subject>> {
        SubjectRepository::add_grade(&*self.0, id, grade).await
    }
}

fn slow_read_fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::default());
    let slow = Arc::new(SlowReads(store.clone()));
    Fixture::with_repos(Repositories {
        users: store.clone(),
        subjects: slow.clone(),
        grades: slow,
        marks: store,
    })
}

#[tokio::test]
async fn test_concurrent_duplicate_marks_yield_one_success() {
    let fx = Fixture::new();
    let teacher = fx.teacher("Teacher", "T-1").await;
    let student = fx.student("Student", "S-1").await;
    let subject = fx.subject("Mathematics", "MATH").await;
    let grade = fx.grade("Grade 5", 5, "A").await;

    let attempts = (0..16).map(|_| fx.mark(&teacher, &student, &subject, &grade, "final", "2024-06-20"));
    let results = join_all(attempts).await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::Conflict { .. })))
        .count();
    assert_eq!(created, 1);
    assert_eq!(conflicts, 15);

    let stored = fx.state.marks.list(Some(&fx.admin)).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_concurrent_enrollment_is_idempotent() {
    let fx = Fixture::new();
    let s1 = fx.student("Student One", "S-1").await;
    let s2 = fx.student("Student Two", "S-2").await;
    let grade = fx.grade("Grade 2", 2, "B").await;

    let calls = [s1, s2, s1, s2, s1, s2, s1, s2].map(|student| {
        fx.state.grades.add_student(
            Some(&fx.admin),
            &grade.id,
            AddStudentCommand {
                student_id: student.id,
            },
        )
    });
    for result in join_all(calls).await {
        result.unwrap();
    }

    let grade = fx.state.grades.get(Some(&fx.admin), &grade.id).await.unwrap();
    let mut ids: Vec<_> = grade.students.iter().map(|s| s.id).collect();
    ids.sort();
    let mut expected = vec![s1.id, s2.id];
    expected.sort();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_concurrent_add_grade_to_subject_is_idempotent() {
    let fx = Fixture::new();
    let subject = fx.subject("Science", "SCI").await;
    let grade = fx.grade("Grade 1", 1, "A").await;

    let calls = (0..8).map(|_| {
        fx.state.subjects.add_grade(
            Some(&fx.admin),
            &subject.id,
            AddGradeCommand { grade_id: grade.id },
        )
    });
    for result in join_all(calls).await {
        result.unwrap();
    }

    let subject = fx.state.subjects.get(Some(&fx.admin), &subject.id).await.unwrap();
    assert_eq!(subject.grades.len(), 1);
}

#[tokio::test]
async fn test_rename_grade_keeps_concurrently_added_student() {
    let fx = slow_read_fixture();
    let student = fx.student("Student", "S-1").await;
    let grade = fx.grade("Grade 4", 4, "C").await;

    let rename = fx
        .state
        .grades
        .update(Some(&fx.admin), &grade.id, command(json!({ "name": "Renamed" })));
    let enroll = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        fx.state
            .grades
            .add_student(
                Some(&fx.admin),
                &grade.id,
                AddStudentCommand {
                    student_id: student.id,
                },
            )
            .await
    };
    let (renamed, enrolled) = tokio::join!(rename, enroll);
    renamed.unwrap();
    enrolled.unwrap();

    let grade = fx.state.grades.get(Some(&fx.admin), &grade.id).await.unwrap();
    assert_eq!(grade.name, "Renamed");
    assert_eq!(grade.students.len(), 1);
    assert_eq!(grade.students[0].id, student.id);
}

#[tokio::test]
async fn test_rename_subject_keeps_concurrently_added_grade() {
    let fx = slow_read_fixture();
    let subject = fx.subject("History", "HIST").await;
    let grade = fx.grade("Grade 6", 6, "A").await;

    let rename = fx
        .state
        .subjects
        .update(Some(&fx.admin), &subject.id, command(json!({ "name": "World History" })));
    let link = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        fx.state
            .subjects
            .add_grade(Some(&fx.admin), &subject.id, AddGradeCommand { grade_id: grade.id })
            .await
    };
    let (renamed, linked) = tokio::join!(rename, link);
    renamed.unwrap();
    linked.unwrap();

    let subject = fx.state.subjects.get(Some(&fx.admin), &subject.id).await.unwrap();
    assert_eq!(subject.name, "World History");
    assert_eq!(subject.grades.len(), 1);
}
