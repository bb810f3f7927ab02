//! 用户接口

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use edu_common::UserId;
use edu_errors::AppResult;
use serde::Deserialize;

use super::MessageResponse;
use crate::api::rest::extract::{ApiJson, ApiPath};
use crate::api::rest::{AppState, CurrentActor};
use crate::application::user::{CreateUserCommand, UpdateUserCommand};
use crate::application::views::UserView;
use crate::domain::actor::Role;

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<Json<Vec<UserView>>> {
    let role = query
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::parse::<Role>)
        .transpose()?;

    Ok(Json(state.users.list(actor.as_ref(), role).await?))
}

pub async fn list_teachers(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<UserView>>> {
    Ok(Json(state.users.list(actor.as_ref(), Some(Role::Teacher)).await?))
}

pub async fn list_students(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<UserView>>> {
    Ok(Json(state.users.list(actor.as_ref(), Some(Role::Student)).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(cmd): ApiJson<CreateUserCommand>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let user = state.users.create(actor.as_ref(), cmd).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<UserId>,
) -> AppResult<Json<UserView>> {
    Ok(Json(state.users.get(actor.as_ref(), &id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(cmd): ApiJson<UpdateUserCommand>,
) -> AppResult<Json<UserView>> {
    Ok(Json(state.users.update(actor.as_ref(), &id, cmd).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<UserId>,
) -> AppResult<Json<MessageResponse>> {
    state.users.delete(actor.as_ref(), &id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
