//! 成绩应用服务

pub mod commands;
pub mod service;

pub use commands::{CreateMarkCommand, UpdateMarkCommand};
pub use service::MarkService;
