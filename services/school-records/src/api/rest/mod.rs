//! REST API（axum）

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{CurrentActor, auth_middleware};
pub use routes::router;
pub use state::AppState;
