use axum::Json;

use super::MessageResponse;

pub async fn root() -> &'static str {
    "Backend is running"
}

pub async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse::new("Server is healthy"))
}
