//! 授权策略领域模块

pub mod evaluator;

pub use evaluator::{Action, Decision, DenyReason, PolicyEvaluator, ResourceKind, Scope, Target};
