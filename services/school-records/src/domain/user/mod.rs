//! 用户领域模块

#![allow(clippy::module_inception)]

pub mod password;
pub mod repository;
pub mod user;

pub use password::{HashedPassword, PasswordError};
pub use repository::UserRepository;
pub use user::{RoleProfile, User};
