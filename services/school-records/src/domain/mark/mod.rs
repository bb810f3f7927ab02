//! 成绩领域模块

#![allow(clippy::module_inception)]

pub mod mark;
pub mod repository;

pub use mark::{ExamType, Mark};
pub use repository::{MarkFilter, MarkRepository};
