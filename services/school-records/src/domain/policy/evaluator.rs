//! 授权策略评估器
//!
//! 纯函数：不访问存储，只根据主体、操作、资源类型与目标记录给出结论。
//! 每次结论都会计入 `authorization_decisions_total`。

use edu_common::UserId;
use edu_errors::{AppError, AppResult};
use edu_telemetry::AUTHORIZATION_DECISIONS_TOTAL;
use tracing::warn;

use crate::domain::actor::{Actor, Role};
use crate::domain::mark::Mark;

/// 资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    User,
    Subject,
    Grade,
    Mark,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Subject => "subject",
            Self::Grade => "grade",
            Self::Mark => "mark",
        }
    }
}

/// 操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
        }
    }
}

/// 被操作的具体记录（只携带归属判断所需的字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    User(UserId),
    Subject,
    Grade,
    Mark { student: UserId, teacher: UserId },
}

impl Target {
    pub fn mark(mark: &Mark) -> Self {
        Self::Mark {
            student: mark.student,
            teacher: mark.teacher,
        }
    }
}

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden,
}

impl DenyReason {
    pub fn into_error(self) -> AppError {
        match self {
            Self::Unauthenticated => AppError::unauthenticated("No token, authorization denied"),
            Self::Forbidden => AppError::forbidden("Access denied"),
        }
    }
}

/// 授权结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// 转换为服务层错误
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason.into_error()),
        }
    }
}

/// 列表查询的可见范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// 不限
    All,
    /// 仅限该学生本人的记录
    Student(UserId),
    /// 仅限该教师录入的记录
    Teacher(UserId),
}

/// 规则表中的单元格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Allow,
    Deny,
    /// 仅当目标记录归属于主体时允许
    Owner,
}

/// 授权策略评估器
///
/// 规则优先级：
/// 1. 未认证一律拒绝
/// 2. 管理员全部允许
/// 3. 教师：可创建/读取成绩、科目、班级，可读取和列出用户；
///    只能修改或删除自己录入的成绩
/// 4. 学生：只能读取自己的用户记录与成绩，不能写
pub struct PolicyEvaluator;

impl PolicyEvaluator {
    fn rule(role: Role, action: Action, kind: ResourceKind) -> Rule {
        use Action::*;
        use ResourceKind as K;

        match role {
            Role::Admin => Rule::Allow,
            Role::Teacher => match (kind, action) {
                (K::Mark, Create | Read | List) => Rule::Allow,
                (K::Mark, Update | Delete) => Rule::Owner,
                (K::Subject | K::Grade, Create | Read | List) => Rule::Allow,
                (K::User, Read | List) => Rule::Allow,
                _ => Rule::Deny,
            },
            Role::Student => match (kind, action) {
                (K::User | K::Mark, Read | List) => Rule::Owner,
                _ => Rule::Deny,
            },
        }
    }

    fn owns(actor: &Actor, target: &Target) -> bool {
        match (actor.role, target) {
            (Role::Student, Target::User(id)) => *id == actor.id,
            (Role::Student, Target::Mark { student, .. }) => *student == actor.id,
            (Role::Teacher, Target::Mark { teacher, .. }) => *teacher == actor.id,
            _ => false,
        }
    }

    /// 对具体记录做出授权判断
    ///
    /// 需要归属判断的规则在没有目标记录时一律拒绝
    pub fn decide(
        actor: Option<&Actor>,
        action: Action,
        kind: ResourceKind,
        target: Option<&Target>,
    ) -> Decision {
        let decision = match actor {
            None => Decision::Deny(DenyReason::Unauthenticated),
            Some(actor) => match Self::rule(actor.role, action, kind) {
                Rule::Allow => Decision::Allow,
                Rule::Deny => Decision::Deny(DenyReason::Forbidden),
                Rule::Owner => match target {
                    Some(target) if Self::owns(actor, target) => Decision::Allow,
                    _ => Decision::Deny(DenyReason::Forbidden),
                },
            },
        };

        Self::record(actor, action, kind, decision);
        decision
    }

    /// 判断并在允许时返回主体
    pub fn authorize<'a>(
        actor: Option<&'a Actor>,
        action: Action,
        kind: ResourceKind,
        target: Option<&Target>,
    ) -> AppResult<&'a Actor> {
        Self::decide(actor, action, kind, target).into_result()?;
        actor.ok_or_else(|| DenyReason::Unauthenticated.into_error())
    }

    /// 加载记录前的快速检查：存在任何可能被允许的目标即放行
    pub fn precheck(actor: Option<&Actor>, action: Action, kind: ResourceKind) -> Decision {
        match actor {
            None => Decision::Deny(DenyReason::Unauthenticated),
            Some(actor) => match Self::rule(actor.role, action, kind) {
                Rule::Allow | Rule::Owner => Decision::Allow,
                Rule::Deny => {
                    let decision = Decision::Deny(DenyReason::Forbidden);
                    Self::record(Some(actor), action, kind, decision);
                    decision
                }
            },
        }
    }

    /// 列表查询的可见范围；不允许列出时返回 None
    pub fn scope_filter(actor: Option<&Actor>, kind: ResourceKind) -> Option<Scope> {
        let actor = actor?;
        match Self::rule(actor.role, Action::List, kind) {
            Rule::Allow => match (actor.role, kind) {
                (Role::Teacher, ResourceKind::Mark) => Some(Scope::Teacher(actor.id)),
                _ => Some(Scope::All),
            },
            Rule::Owner => match actor.role {
                Role::Student => Some(Scope::Student(actor.id)),
                Role::Teacher => Some(Scope::Teacher(actor.id)),
                Role::Admin => Some(Scope::All),
            },
            Rule::Deny => None,
        }
    }

    /// 列表查询的授权：返回范围或对应的拒绝错误
    pub fn authorize_list(actor: Option<&Actor>, kind: ResourceKind) -> AppResult<Scope> {
        match Self::scope_filter(actor, kind) {
            Some(scope) => {
                Self::record(actor, Action::List, kind, Decision::Allow);
                Ok(scope)
            }
            None => {
                let reason = if actor.is_none() {
                    DenyReason::Unauthenticated
                } else {
                    DenyReason::Forbidden
                };
                Self::record(actor, Action::List, kind, Decision::Deny(reason));
                Err(reason.into_error())
            }
        }
    }

    fn record(actor: Option<&Actor>, action: Action, kind: ResourceKind, decision: Decision) {
        let allowed = decision.is_allowed();
        metrics::counter!(
            AUTHORIZATION_DECISIONS_TOTAL,
            "kind" => kind.as_str(),
            "action" => action.as_str(),
            "allowed" => if allowed { "true" } else { "false" }
        )
        .increment(1);

        if !allowed {
            warn!(
                actor_id = ?actor.map(|a| a.id),
                role = ?actor.map(|a| a.role),
                kind = kind.as_str(),
                action = action.as_str(),
                "Authorization denied"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Actor {
        Actor::new(UserId::new(), Role::Admin)
    }

    fn teacher() -> Actor {
        Actor::new(UserId::new(), Role::Teacher)
    }

    fn student() -> Actor {
        Actor::new(UserId::new(), Role::Student)
    }

    const ALL_KINDS: [ResourceKind; 4] = [
        ResourceKind::User,
        ResourceKind::Subject,
        ResourceKind::Grade,
        ResourceKind::Mark,
    ];

    const ALL_ACTIONS: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::List,
    ];

    #[test]
    fn test_unauthenticated_is_always_denied() {
        for kind in ALL_KINDS {
            for action in ALL_ACTIONS {
                assert_eq!(
                    PolicyEvaluator::decide(None, action, kind, None),
                    Decision::Deny(DenyReason::Unauthenticated)
                );
            }
            assert_eq!(PolicyEvaluator::scope_filter(None, kind), None);
        }
    }

    #[test]
    fn test_admin_is_always_allowed() {
        let admin = admin();
        for kind in ALL_KINDS {
            for action in ALL_ACTIONS {
                assert!(PolicyEvaluator::decide(Some(&admin), action, kind, None).is_allowed());
            }
            assert_eq!(PolicyEvaluator::scope_filter(Some(&admin), kind), Some(Scope::All));
        }
    }

    #[test]
    fn test_teacher_may_only_modify_own_marks() {
        let teacher_a = teacher();
        let teacher_b = teacher();
        let own = Target::Mark {
            student: UserId::new(),
            teacher: teacher_a.id,
        };

        for action in [Action::Update, Action::Delete] {
            assert!(
                PolicyEvaluator::decide(Some(&teacher_a), action, ResourceKind::Mark, Some(&own))
                    .is_allowed()
            );
            assert_eq!(
                PolicyEvaluator::decide(Some(&teacher_b), action, ResourceKind::Mark, Some(&own)),
                Decision::Deny(DenyReason::Forbidden)
            );
            assert!(
                !PolicyEvaluator::decide(Some(&teacher_a), action, ResourceKind::Mark, None)
                    .is_allowed()
            );
        }
    }

    #[test]
    fn test_teacher_cannot_modify_users_subjects_grades() {
        let teacher = teacher();
        for kind in [ResourceKind::User, ResourceKind::Subject, ResourceKind::Grade] {
            for action in [Action::Update, Action::Delete] {
                assert!(!PolicyEvaluator::decide(Some(&teacher), action, kind, None).is_allowed());
            }
        }
        assert!(
            !PolicyEvaluator::decide(Some(&teacher), Action::Create, ResourceKind::User, None)
                .is_allowed()
        );
    }

    #[test]
    fn test_teacher_may_create_and_read() {
        let teacher = teacher();
        for kind in [ResourceKind::Mark, ResourceKind::Subject, ResourceKind::Grade] {
            for action in [Action::Create, Action::Read] {
                assert!(PolicyEvaluator::decide(Some(&teacher), action, kind, None).is_allowed());
            }
        }
        assert!(
            PolicyEvaluator::decide(Some(&teacher), Action::Read, ResourceKind::User, None)
                .is_allowed()
        );
    }

    #[test]
    fn test_student_reads_only_own_records() {
        let me = student();
        let other = UserId::new();

        assert!(
            PolicyEvaluator::decide(
                Some(&me),
                Action::Read,
                ResourceKind::User,
                Some(&Target::User(me.id))
            )
            .is_allowed()
        );
        assert_eq!(
            PolicyEvaluator::decide(
                Some(&me),
                Action::Read,
                ResourceKind::User,
                Some(&Target::User(other))
            ),
            Decision::Deny(DenyReason::Forbidden)
        );

        let own_mark = Target::Mark {
            student: me.id,
            teacher: UserId::new(),
        };
        let other_mark = Target::Mark {
            student: other,
            teacher: UserId::new(),
        };
        assert!(
            PolicyEvaluator::decide(Some(&me), Action::Read, ResourceKind::Mark, Some(&own_mark))
                .is_allowed()
        );
        assert!(
            !PolicyEvaluator::decide(Some(&me), Action::Read, ResourceKind::Mark, Some(&other_mark))
                .is_allowed()
        );
    }

    #[test]
    fn test_student_cannot_write_anything() {
        let me = student();
        let own = Target::User(me.id);
        for kind in ALL_KINDS {
            for action in [Action::Create, Action::Update, Action::Delete] {
                assert!(!PolicyEvaluator::decide(Some(&me), action, kind, Some(&own)).is_allowed());
            }
        }
    }

    #[test]
    fn test_scope_filter_per_role() {
        let teacher = teacher();
        let student = student();

        assert_eq!(
            PolicyEvaluator::scope_filter(Some(&teacher), ResourceKind::Mark),
            Some(Scope::Teacher(teacher.id))
        );
        for kind in [ResourceKind::User, ResourceKind::Subject, ResourceKind::Grade] {
            assert_eq!(PolicyEvaluator::scope_filter(Some(&teacher), kind), Some(Scope::All));
        }

        assert_eq!(
            PolicyEvaluator::scope_filter(Some(&student), ResourceKind::Mark),
            Some(Scope::Student(student.id))
        );
        assert_eq!(
            PolicyEvaluator::scope_filter(Some(&student), ResourceKind::User),
            Some(Scope::Student(student.id))
        );
        assert_eq!(PolicyEvaluator::scope_filter(Some(&student), ResourceKind::Subject), None);
        assert_eq!(PolicyEvaluator::scope_filter(Some(&student), ResourceKind::Grade), None);
    }

    #[test]
    fn test_precheck_lets_ownership_rules_through() {
        let student = student();
        assert!(PolicyEvaluator::precheck(Some(&student), Action::Read, ResourceKind::Mark).is_allowed());
        assert!(!PolicyEvaluator::precheck(Some(&student), Action::Read, ResourceKind::Grade).is_allowed());
        assert_eq!(
            PolicyEvaluator::precheck(None, Action::Read, ResourceKind::Mark),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn test_authorize_list_maps_denials() {
        let student = student();
        assert!(matches!(
            PolicyEvaluator::authorize_list(None, ResourceKind::Mark),
            Err(AppError::Unauthenticated(_))
        ));
        assert!(matches!(
            PolicyEvaluator::authorize_list(Some(&student), ResourceKind::Subject),
            Err(AppError::Forbidden(_))
        ));
    }
}
