//! 班级应用服务

pub mod commands;
pub mod service;

pub use commands::{AddStudentCommand, CreateGradeCommand, UpdateGradeCommand};
pub use service::GradeService;
