//! 班级接口

use axum::{Json, extract::State, http::StatusCode};
use edu_errors::AppResult;

use super::MessageResponse;
use crate::api::rest::extract::{ApiJson, ApiPath};
use crate::api::rest::{AppState, CurrentActor};
use crate::application::grade::{AddStudentCommand, CreateGradeCommand, UpdateGradeCommand};
use crate::application::views::GradeView;
use crate::domain::ids::GradeId;

pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<GradeView>>> {
    Ok(Json(state.grades.list(actor.as_ref()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(cmd): ApiJson<CreateGradeCommand>,
) -> AppResult<(StatusCode, Json<GradeView>)> {
    let grade = state.grades.create(actor.as_ref(), cmd).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<GradeId>,
) -> AppResult<Json<GradeView>> {
    Ok(Json(state.grades.get(actor.as_ref(), &id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<GradeId>,
    ApiJson(cmd): ApiJson<UpdateGradeCommand>,
) -> AppResult<Json<GradeView>> {
    Ok(Json(state.grades.update(actor.as_ref(), &id, cmd).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<GradeId>,
) -> AppResult<Json<MessageResponse>> {
    state.grades.delete(actor.as_ref(), &id).await?;
    Ok(Json(MessageResponse::new("Grade deleted successfully")))
}

pub async fn add_student(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<GradeId>,
    ApiJson(cmd): ApiJson<AddStudentCommand>,
) -> AppResult<Json<GradeView>> {
    Ok(Json(state.grades.add_student(actor.as_ref(), &id, cmd).await?))
}
