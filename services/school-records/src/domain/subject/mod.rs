//! 科目领域模块

#![allow(clippy::module_inception)]

pub mod repository;
pub mod subject;

pub use repository::SubjectRepository;
pub use subject::{Subject, SubjectPatch};
