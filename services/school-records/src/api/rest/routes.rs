//! 路由表

use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{auth, grades, health, marks, subjects, users};
use super::middleware::auth_middleware;
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health_check))
        .merge(auth_routes())
        .merge(user_routes())
        .merge(subject_routes())
        .merge(grade_routes())
        .merge(mark_routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/me", get(auth::me))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/role/teachers", get(users::list_teachers))
        .route("/api/users/role/students", get(users::list_students))
        .route(
            "/api/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
}

fn subject_routes() -> Router<AppState> {
    Router::new()
        .route("/api/subjects", get(subjects::list).post(subjects::create))
        .route(
            "/api/subjects/{id}",
            get(subjects::get).put(subjects::update).delete(subjects::delete),
        )
        .route("/api/subjects/{id}/grades", post(subjects::add_grade))
}

fn grade_routes() -> Router<AppState> {
    Router::new()
        .route("/api/grades", get(grades::list).post(grades::create))
        .route(
            "/api/grades/{id}",
            get(grades::get).put(grades::update).delete(grades::delete),
        )
        .route("/api/grades/{id}/students", post(grades::add_student))
}

fn mark_routes() -> Router<AppState> {
    Router::new()
        .route("/api/marks", get(marks::list).post(marks::create))
        .route("/api/marks/student/{id}", get(marks::list_by_student))
        .route(
            "/api/marks/{id}",
            get(marks::get).put(marks::update).delete(marks::delete),
        )
}
