//! 认证应用服务

pub mod commands;
pub mod service;

pub use commands::{AuthResponse, LoginCommand};
pub use service::AuthService;
