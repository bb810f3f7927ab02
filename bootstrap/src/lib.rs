//! edu-bootstrap - 统一服务启动骨架
//!
//! 配置加载、运行时初始化、基础设施创建与 HTTP 服务启动

mod infrastructure;
mod retry;
mod runtime;
mod starter;

pub use infrastructure::*;
pub use retry::*;
pub use runtime::*;
pub use starter::*;
