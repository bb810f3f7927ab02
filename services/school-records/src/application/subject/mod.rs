//! 科目应用服务

pub mod commands;
pub mod service;

pub use commands::{AddGradeCommand, CreateSubjectCommand, UpdateSubjectCommand};
pub use service::SubjectService;
