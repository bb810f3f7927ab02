//! 接口层

pub mod rest;
