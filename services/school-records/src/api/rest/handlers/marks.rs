//! 成绩接口

use axum::{Json, extract::State, http::StatusCode};
use edu_common::UserId;
use edu_errors::AppResult;

use super::MessageResponse;
use crate::api::rest::extract::{ApiJson, ApiPath};
use crate::api::rest::{AppState, CurrentActor};
use crate::application::mark::{CreateMarkCommand, UpdateMarkCommand};
use crate::application::views::MarkView;
use crate::domain::ids::MarkId;

pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<MarkView>>> {
    Ok(Json(state.marks.list(actor.as_ref()).await?))
}

/// 教师只能看到自己录入的成绩，不再返回该学生的全部成绩
pub async fn list_by_student(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(student): ApiPath<UserId>,
) -> AppResult<Json<Vec<MarkView>>> {
    Ok(Json(state.marks.list_by_student(actor.as_ref(), &student).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(cmd): ApiJson<CreateMarkCommand>,
) -> AppResult<(StatusCode, Json<MarkView>)> {
    let mark = state.marks.create(actor.as_ref(), cmd).await?;
    Ok((StatusCode::CREATED, Json(mark)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<MarkId>,
) -> AppResult<Json<MarkView>> {
    Ok(Json(state.marks.get(actor.as_ref(), &id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<MarkId>,
    ApiJson(cmd): ApiJson<UpdateMarkCommand>,
) -> AppResult<Json<MarkView>> {
    Ok(Json(state.marks.update(actor.as_ref(), &id, cmd).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<MarkId>,
) -> AppResult<Json<MessageResponse>> {
    state.marks.delete(actor.as_ref(), &id).await?;
    Ok(Json(MessageResponse::new("Mark deleted successfully")))
}
