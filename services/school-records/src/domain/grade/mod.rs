//! 班级领域模块

#![allow(clippy::module_inception)]

pub mod grade;
pub mod repository;

pub use grade::{Grade, GradePatch};
pub use repository::GradeRepository;
