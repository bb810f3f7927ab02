//! 集成测试共用夹具：内存存储 + 已组装的服务

#![allow(dead_code)]

use std::sync::Arc;

use edu_auth_core::TokenService;
use edu_common::UserId;
use edu_errors::AppResult;
use school_records::application::views::{GradeView, MarkView, SubjectView};
use school_records::domain::{Actor, Role};
use school_records::{AppState, Repositories};
use serde_json::{Value, json};

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

pub fn token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(JWT_SECRET, 3600, "school-records", "school-dashboard"))
}

pub fn command<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("command payload should deserialize")
}

pub struct Fixture {
    pub state: AppState,
    pub admin: Actor,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_repos(Repositories::in_memory())
    }

    pub fn with_repos(repos: Repositories) -> Self {
        Self {
            state: AppState::new(repos, token_service(), true),
            admin: Actor::new(UserId::new(), Role::Admin),
        }
    }

    pub async fn student(&self, name: &str, student_id: &str) -> Actor {
        let view = self
            .state
            .users
            .create(
                Some(&self.admin),
                command(json!({
                    "name": name,
                    "email": format!("{}@school.test", student_id.to_lowercase()),
                    "password": "secret123",
                    "role": "student",
                    "studentId": student_id,
                })),
            )
            .await
            .expect("student should be created");
        Actor::new(view.id, Role::Student)
    }

    pub async fn teacher(&self, name: &str, teacher_id: &str) -> Actor {
        let view = self
            .state
            .users
            .create(
                Some(&self.admin),
                command(json!({
                    "name": name,
                    "email": format!("{}@school.test", teacher_id.to_lowercase()),
                    "password": "secret123",
                    "role": "teacher",
                    "teacherId": teacher_id,
                })),
            )
            .await
            .expect("teacher should be created");
        Actor::new(view.id, Role::Teacher)
    }

    pub async fn subject(&self, name: &str, code: &str) -> SubjectView {
        self.state
            .subjects
            .create(Some(&self.admin), command(json!({ "name": name, "code": code })))
            .await
            .expect("subject should be created")
    }

    pub async fn grade(&self, name: &str, level: i64, section: &str) -> GradeView {
        self.state
            .grades
            .create(
                Some(&self.admin),
                command(json!({ "name": name, "level": level, "section": section })),
            )
            .await
            .expect("grade should be created")
    }

    pub async fn mark(
        &self,
        teacher: &Actor,
        student: &Actor,
        subject: &SubjectView,
        grade: &GradeView,
        exam_type: &str,
        exam_date: &str,
    ) -> AppResult<MarkView> {
        self.state
            .marks
            .create(
                Some(teacher),
                command(json!({
                    "student": student.id,
                    "subject": subject.id,
                    "grade": grade.id,
                    "marks": 78,
                    "examType": exam_type,
                    "examDate": exam_date,
                })),
            )
            .await
    }
}
