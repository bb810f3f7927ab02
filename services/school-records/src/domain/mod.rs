//! 领域层

pub mod actor;
pub mod grade;
pub mod ids;
pub mod mark;
pub mod policy;
pub mod subject;
pub mod user;

pub use actor::{Actor, Role};
pub use ids::{GradeId, MarkId, SubjectId};
pub use edu_common::UserId;
