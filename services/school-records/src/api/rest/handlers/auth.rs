//! 认证接口

use axum::{Json, extract::State, http::StatusCode};
use edu_errors::AppResult;

use crate::api::rest::extract::ApiJson;
use crate::api::rest::{AppState, CurrentActor};
use crate::application::auth::{AuthResponse, LoginCommand};
use crate::application::user::CreateUserCommand;
use crate::application::views::UserView;

pub async fn login(
    State(state): State<AppState>,
    ApiJson(cmd): ApiJson<LoginCommand>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(state.auth.login(cmd).await?))
}

pub async fn register(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(cmd): ApiJson<CreateUserCommand>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response = state.auth.register(actor.as_ref(), cmd).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn me(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<UserView>> {
    Ok(Json(state.auth.me(actor.as_ref()).await?))
}
