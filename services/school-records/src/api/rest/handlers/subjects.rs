//! 科目接口

use axum::{Json, extract::State, http::StatusCode};
use edu_errors::AppResult;

use super::MessageResponse;
use crate::api::rest::extract::{ApiJson, ApiPath};
use crate::api::rest::{AppState, CurrentActor};
use crate::application::subject::{AddGradeCommand, CreateSubjectCommand, UpdateSubjectCommand};
use crate::application::views::SubjectView;
use crate::domain::ids::SubjectId;

pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<SubjectView>>> {
    Ok(Json(state.subjects.list(actor.as_ref()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(cmd): ApiJson<CreateSubjectCommand>,
) -> AppResult<(StatusCode, Json<SubjectView>)> {
    let subject = state.subjects.create(actor.as_ref(), cmd).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<SubjectId>,
) -> AppResult<Json<SubjectView>> {
    Ok(Json(state.subjects.get(actor.as_ref(), &id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<SubjectId>,
    ApiJson(cmd): ApiJson<UpdateSubjectCommand>,
) -> AppResult<Json<SubjectView>> {
    Ok(Json(state.subjects.update(actor.as_ref(), &id, cmd).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<SubjectId>,
) -> AppResult<Json<MessageResponse>> {
    state.subjects.delete(actor.as_ref(), &id).await?;
    Ok(Json(MessageResponse::new("Subject deleted successfully")))
}

pub async fn add_grade(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<SubjectId>,
    ApiJson(cmd): ApiJson<AddGradeCommand>,
) -> AppResult<Json<SubjectView>> {
    Ok(Json(state.subjects.add_grade(actor.as_ref(), &id, cmd).await?))
}
