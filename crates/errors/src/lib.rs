//! edu-errors - 统一错误处理
//!
//! 基于 RFC 7807 Problem Details 规范

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error on '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Conflict: {message}")]
    Conflict { fields: Vec<String>, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn conflict<I, S>(fields: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Conflict {
            fields: fields.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 转换为 HTTP 状态码
    ///
    /// 唯一性冲突与校验失败一样返回 400
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation { .. } | Self::Conflict { .. } => 400,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// 是否为服务端错误（存储故障等）
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// 转换为 Problem Details
    pub fn to_problem_details(&self) -> ProblemDetails {
        // 服务端错误不向调用方暴露底层信息
        let detail = if self.is_server_error() {
            "Server error".to_string()
        } else {
            self.public_message()
        };

        let (field, conflicting_fields) = match self {
            Self::Validation { field, .. } => (Some(field.clone()), None),
            Self::Conflict { fields, .. } => (None, Some(fields.clone())),
            _ => (None, None),
        };

        ProblemDetails {
            r#type: self.problem_type().to_string(),
            title: self.problem_title().to_string(),
            status: self.status_code(),
            message: detail.clone(),
            detail,
            instance: None,
            field,
            conflicting_fields,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Unauthenticated(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Database(msg)
            | Self::Internal(msg) => msg.clone(),
            Self::Validation { reason, .. } => reason.clone(),
            Self::Conflict { message, .. } => message.clone(),
        }
    }

    fn problem_type(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "urn:edu:problem:unauthenticated",
            Self::Forbidden(_) => "urn:edu:problem:forbidden",
            Self::NotFound(_) => "urn:edu:problem:not-found",
            Self::Validation { .. } => "urn:edu:problem:validation",
            Self::Conflict { .. } => "urn:edu:problem:conflict",
            Self::Database(_) => "urn:edu:problem:store-failure",
            Self::Internal(_) => "urn:edu:problem:internal",
        }
    }

    fn problem_title(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "Unauthenticated",
            Self::Forbidden(_) => "Access Denied",
            Self::NotFound(_) => "Resource Not Found",
            Self::Validation { .. } => "Validation Error",
            Self::Conflict { .. } => "Already Exists",
            Self::Database(_) => "Store Failure",
            Self::Internal(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            tracing::error!(error = %self, "Request failed with server error");
        }

        let problem = self.to_problem_details();
        let status =
            StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(problem)).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// RFC 7807 Problem Details
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    /// 与 detail 相同，兼容前端读取 `message`
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_fields: Option<Vec<String>>,
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_http_mapping() {
        assert_eq!(AppError::unauthenticated("x").status_code(), 401);
        assert_eq!(AppError::forbidden("x").status_code(), 403);
        assert_eq!(AppError::not_found("x").status_code(), 404);
        assert_eq!(AppError::validation("marks", "out of range").status_code(), 400);
        assert_eq!(AppError::conflict(["code"], "dup").status_code(), 400);
        assert_eq!(AppError::database("boom").status_code(), 500);
    }

    #[test]
    fn test_problem_details_hides_store_failure_text() {
        let problem = AppError::database("connection refused on 10.0.0.3").to_problem_details();
        assert_eq!(problem.status, 500);
        assert_eq!(problem.detail, "Server error");
        assert!(!problem.message.contains("10.0.0.3"));
    }

    #[test]
    fn test_problem_details_carries_conflicting_fields() {
        let problem = AppError::conflict(["code"], "Subject code already exists").to_problem_details();
        assert_eq!(problem.conflicting_fields, Some(vec!["code".to_string()]));
        assert_eq!(problem.message, "Subject code already exists");
    }

    #[test]
    fn test_validation_problem_names_field() {
        let problem = AppError::validation("level", "Level must be between 1 and 12").to_problem_details();
        assert_eq!(problem.field.as_deref(), Some("level"));
        assert_eq!(problem.title, "Validation Error");
    }

    #[test]
    fn test_into_response_sets_status_and_content_type() {
        let response = AppError::forbidden("Access denied").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
    }
}
