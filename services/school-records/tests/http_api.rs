//! HTTP 接口测试：通过 `tower::ServiceExt::oneshot` 直接驱动路由

mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::token_service;
use school_records::{Repositories, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(allow_self_registration: bool) -> Router {
    build_router(Repositories::in_memory(), token_service(), allow_self_registration)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, body: Value) -> (String, Value) {
    let (status, value) = send(app, "POST", "/api/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    (value["token"].as_str().unwrap().to_string(), value["user"].clone())
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app(true);

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Server is healthy");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Backend is running");
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthenticated() {
    let app = app(true);

    let (status, body) = send(&app, "GET", "/api/marks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token, authorization denied");

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = app(true);
    let (_, user) = register(
        &app,
        json!({
            "name": "Alice Student",
            "email": "Alice@School.Test",
            "password": "secret123",
            "studentId": "S-100",
        }),
    )
    .await;
    assert_eq!(user["role"], "student");
    assert_eq!(user["email"], "alice@school.test");
    assert!(user.get("password").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@school.test", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@school.test", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["studentId"], "S-100");
    assert!(me["enrolledGrade"].is_null());
}

#[tokio::test]
async fn test_self_registration_cannot_create_admin() {
    let app = app(true);
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Mallory",
            "email": "mallory@school.test",
            "password": "secret123",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let closed = self::app(false);
    let (status, _) = send(
        &closed,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Bob",
            "email": "bob@school.test",
            "password": "secret123",
            "studentId": "S-1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_payloads_are_rejected() {
    let app = app(true);
    let (teacher, _) = register(
        &app,
        json!({
            "name": "Tina Teacher",
            "email": "tina@school.test",
            "password": "secret123",
            "role": "teacher",
            "teacherId": "T-1",
        }),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/subjects",
        Some(&teacher),
        Some(json!({ "name": "Math", "code": "M1", "color": "blue" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "body");

    let (status, body) = send(&app, "GET", "/api/subjects/not-an-id", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "id");
}

#[tokio::test]
async fn test_teacher_records_marks_over_http() {
    let app = app(true);
    let (teacher, teacher_user) = register(
        &app,
        json!({
            "name": "Tina Teacher",
            "email": "tina@school.test",
            "password": "secret123",
            "role": "teacher",
            "teacherId": "T-1",
        }),
    )
    .await;
    let (student, student_user) = register(
        &app,
        json!({
            "name": "Sam Student",
            "email": "sam@school.test",
            "password": "secret123",
            "studentId": "S-1",
        }),
    )
    .await;

    let (status, subject) = send(
        &app,
        "POST",
        "/api/subjects",
        Some(&teacher),
        Some(json!({ "name": "Mathematics", "code": "math101" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(subject["code"], "MATH101");

    let (status, grade) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&teacher),
        Some(json!({ "name": "Grade 5", "level": 5, "section": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let payload = json!({
        "student": student_user["id"],
        "subject": subject["id"],
        "grade": grade["id"],
        "teacher": student_user["id"],
        "marks": 91,
        "examType": "final",
        "examDate": "2024-06-15",
        "remarks": "  Excellent  ",
    });
    let (status, mark) = send(&app, "POST", "/api/marks", Some(&teacher), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(mark["teacher"]["id"], teacher_user["id"]);
    assert_eq!(mark["remarks"], "Excellent");
    assert_eq!(mark["student"]["studentId"], "S-1");

    let (status, body) = send(&app, "POST", "/api/marks", Some(&teacher), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["conflictingFields"],
        json!(["student", "subject", "examType", "examDate"])
    );

    let (status, marks) = send(&app, "GET", "/api/marks", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marks.as_array().unwrap().len(), 1);

    let uri = format!("/api/marks/{}", mark["id"].as_str().unwrap());
    let (status, _) = send(&app, "DELETE", &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "DELETE", &uri, Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Mark deleted successfully");

    let (status, _) = send(&app, "GET", &uri, Some(&teacher), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_role_listings() {
    let app = app(true);
    let (teacher, _) = register(
        &app,
        json!({
            "name": "Tina Teacher",
            "email": "tina@school.test",
            "password": "secret123",
            "role": "teacher",
            "teacherId": "T-1",
        }),
    )
    .await;
    let (student, _) = register(
        &app,
        json!({
            "name": "Sam Student",
            "email": "sam@school.test",
            "password": "secret123",
            "studentId": "S-1",
        }),
    )
    .await;

    let (status, students) = send(&app, "GET", "/api/users/role/students", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(students.as_array().unwrap().len(), 1);
    assert_eq!(students[0]["role"], "student");

    let (status, teachers) = send(&app, "GET", "/api/users?role=teacher", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(teachers.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/api/users?role=janitor", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, visible) = send(&app, "GET", "/api/users", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(visible.as_array().unwrap().len(), 1);
    assert_eq!(visible[0]["studentId"], "S-1");
}

#[tokio::test]
async fn test_bootstrap_admin_is_idempotent_and_can_log_in() {
    use school_records::AppState;
    use secrecy::Secret;

    let state = AppState::new(Repositories::in_memory(), token_service(), false);
    let password = Secret::new("admin-password".to_string());
    for _ in 0..2 {
        state
            .auth
            .ensure_bootstrap_admin("Administrator", "Admin@School.Local", &password)
            .await
            .unwrap();
    }

    let app = school_records::api::rest::router(state);
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "admin@school.local", "password": "admin-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");
    let admin = body["token"].as_str().unwrap().to_string();

    let (status, users) = send(&app, "GET", "/api/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 1);

    let (status, created) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(&admin),
        Some(json!({
            "name": "Second Admin",
            "email": "second@school.local",
            "password": "secret123",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["user"]["role"], "admin");
}
