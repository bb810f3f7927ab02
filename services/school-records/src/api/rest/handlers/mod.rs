//! 请求处理函数：提取参数、调用应用服务、返回 JSON

pub mod auth;
pub mod grades;
pub mod health;
pub mod marks;
pub mod subjects;
pub mod users;

use serde::Serialize;

/// 删除成功等只有提示信息的响应
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
