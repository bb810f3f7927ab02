//! 用户服务

use edu_common::UserId;
use edu_errors::{AppError, AppResult};
use secrecy::ExposeSecret;
use tracing::info;

use super::commands::{CreateUserCommand, UpdateUserCommand};
use crate::application::references::{self, References};
use crate::application::views::UserView;
use crate::application::{Repositories, WriteOp, record_write};
use crate::domain::actor::{Actor, Role};
use crate::domain::ids::{GradeId, SubjectId};
use crate::domain::policy::{Action, PolicyEvaluator, ResourceKind, Scope, Target};
use crate::domain::user::{HashedPassword, RoleProfile, User};
use crate::error::{RecordError, translate_conflict};

const KIND: ResourceKind = ResourceKind::User;

/// 角色专属字段（创建与更新共用）
#[derive(Debug, Default)]
struct ProfileFields {
    student_id: Option<String>,
    teacher_id: Option<String>,
    enrolled_grade: Option<Option<GradeId>>,
    assigned_subjects: Option<Vec<SubjectId>>,
    assigned_grades: Option<Vec<GradeId>>,
}

impl ProfileFields {
    /// 拒绝与目标角色不符的字段
    fn check_against(&self, role: Role) -> AppResult<()> {
        let foreign = match role {
            Role::Admin => [
                ("studentId", self.student_id.is_some()),
                ("teacherId", self.teacher_id.is_some()),
                ("enrolledGrade", self.enrolled_grade.is_some()),
                ("assignedSubjects", self.assigned_subjects.is_some()),
                ("assignedGrades", self.assigned_grades.is_some()),
            ]
            .into_iter()
            .find(|(_, present)| *present),
            Role::Teacher => [
                ("studentId", self.student_id.is_some()),
                ("enrolledGrade", self.enrolled_grade.is_some()),
            ]
            .into_iter()
            .find(|(_, present)| *present),
            Role::Student => [
                ("teacherId", self.teacher_id.is_some()),
                ("assignedSubjects", self.assigned_subjects.is_some()),
                ("assignedGrades", self.assigned_grades.is_some()),
            ]
            .into_iter()
            .find(|(_, present)| *present),
        };

        match foreign {
            Some((field, _)) => Err(AppError::validation(
                field,
                format!("Field is not applicable to role '{}'", role),
            )),
            None => Ok(()),
        }
    }

    /// 按目标角色构建资料；角色未变时未提供的字段沿用旧值
    fn into_profile(self, role: Role, current: Option<&RoleProfile>) -> AppResult<RoleProfile> {
        self.check_against(role)?;

        match role {
            Role::Admin => Ok(RoleProfile::Admin),
            Role::Teacher => {
                let (old_id, old_subjects, old_grades) = match current {
                    Some(RoleProfile::Teacher {
                        teacher_id,
                        assigned_subjects,
                        assigned_grades,
                    }) => (
                        Some(teacher_id.as_str()),
                        assigned_subjects.clone(),
                        assigned_grades.clone(),
                    ),
                    _ => (None, Vec::new(), Vec::new()),
                };
                RoleProfile::teacher(
                    self.teacher_id.as_deref().or(old_id),
                    self.assigned_subjects.unwrap_or(old_subjects),
                    self.assigned_grades.unwrap_or(old_grades),
                )
            }
            Role::Student => {
                let (old_id, old_grade) = match current {
                    Some(RoleProfile::Student {
                        student_id,
                        enrolled_grade,
                    }) => (Some(student_id.as_str()), *enrolled_grade),
                    _ => (None, None),
                };
                RoleProfile::student(
                    self.student_id.as_deref().or(old_id),
                    self.enrolled_grade.unwrap_or(old_grade),
                )
            }
        }
    }
}

fn parse_role(raw: Option<&str>, default: Role) -> AppResult<Role> {
    raw.map(|r| r.trim().parse()).unwrap_or(Ok(default))
}

/// 用户服务
#[derive(Clone)]
pub struct UserService {
    repos: Repositories,
}

impl UserService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// 创建用户（仅管理员）
    pub async fn create(&self, actor: Option<&Actor>, cmd: CreateUserCommand) -> AppResult<UserView> {
        PolicyEvaluator::decide(actor, Action::Create, KIND, None).into_result()?;
        let user = self.insert(cmd).await?;
        info!(
            user_id = %user.id,
            role = %user.role(),
            actor_id = ?actor.map(|a| a.id),
            "User created"
        );
        self.view(&user).await
    }

    /// 校验并写入新用户，不做授权判断（注册与启动引导共用）
    pub(crate) async fn insert(&self, cmd: CreateUserCommand) -> AppResult<User> {
        let name = User::validate_name(&cmd.name)?;
        let email = User::normalize_email(&cmd.email)?;
        let role = parse_role(cmd.role.as_deref(), Role::Student)?;

        let fields = ProfileFields {
            student_id: cmd.student_id,
            teacher_id: cmd.teacher_id,
            enrolled_grade: cmd.enrolled_grade.map(Some),
            assigned_subjects: cmd.assigned_subjects,
            assigned_grades: cmd.assigned_grades,
        };
        let profile = fields.into_profile(role, None)?;
        self.check_profile_refs(&profile).await?;

        let password = HashedPassword::from_plain(cmd.password.expose_secret())?;
        let user = User::new(name, email, password, profile);

        self.repos
            .users
            .create(&user)
            .await
            .map_err(|e| translate_conflict(e, || RecordError::EmailAlreadyRegistered(user.email.clone())))?;

        record_write(KIND, WriteOp::Create);
        Ok(user)
    }

    pub async fn get(&self, actor: Option<&Actor>, id: &UserId) -> AppResult<UserView> {
        PolicyEvaluator::precheck(actor, Action::Read, KIND).into_result()?;

        let user = self
            .repos
            .users
            .find_by_id(id)
            .await?
            .ok_or(RecordError::UserNotFound)?;

        PolicyEvaluator::decide(actor, Action::Read, KIND, Some(&Target::User(user.id)))
            .into_result()?;

        self.view(&user).await
    }

    /// 列出用户，可按角色过滤；学生只能看到自己
    pub async fn list(&self, actor: Option<&Actor>, role: Option<Role>) -> AppResult<Vec<UserView>> {
        let scope = PolicyEvaluator::authorize_list(actor, KIND)?;

        let mut users = self.repos.users.list(role).await?;
        match scope {
            Scope::All => {}
            Scope::Student(id) | Scope::Teacher(id) => users.retain(|u| u.id == id),
        }

        self.views(&users).await
    }

    pub async fn update(
        &self,
        actor: Option<&Actor>,
        id: &UserId,
        cmd: UpdateUserCommand,
    ) -> AppResult<UserView> {
        PolicyEvaluator::precheck(actor, Action::Update, KIND).into_result()?;

        let mut user = self
            .repos
            .users
            .find_by_id(id)
            .await?
            .ok_or(RecordError::UserNotFound)?;

        PolicyEvaluator::decide(actor, Action::Update, KIND, Some(&Target::User(user.id)))
            .into_result()?;

        if let Some(name) = &cmd.name {
            user.name = User::validate_name(name)?;
        }
        if let Some(email) = &cmd.email {
            user.email = User::normalize_email(email)?;
        }

        let role = parse_role(cmd.role.as_deref(), user.role())?;
        let fields = ProfileFields {
            student_id: cmd.student_id,
            teacher_id: cmd.teacher_id,
            enrolled_grade: cmd.enrolled_grade,
            assigned_subjects: cmd.assigned_subjects,
            assigned_grades: cmd.assigned_grades,
        };
        // 角色变化时重新构建资料，旧角色的字段不保留
        let current = (role == user.role()).then_some(&user.profile);
        let profile = fields.into_profile(role, current)?;
        self.check_profile_refs(&profile).await?;
        user.profile = profile;

        if let Some(password) = &cmd.password {
            user.password = HashedPassword::from_plain(password.expose_secret())?;
        }

        user.audit_info.touch();

        let updated = self
            .repos
            .users
            .update(&user)
            .await
            .map_err(|e| translate_conflict(e, || RecordError::EmailAlreadyRegistered(user.email.clone())))?;
        if !updated {
            return Err(RecordError::UserNotFound.into());
        }

        record_write(KIND, WriteOp::Update);
        info!(user_id = %user.id, actor_id = ?actor.map(|a| a.id), "User updated");

        self.view(&user).await
    }

    pub async fn delete(&self, actor: Option<&Actor>, id: &UserId) -> AppResult<()> {
        PolicyEvaluator::decide(actor, Action::Delete, KIND, Some(&Target::User(*id)))
            .into_result()?;

        if !self.repos.users.delete(id).await? {
            return Err(RecordError::UserNotFound.into());
        }

        record_write(KIND, WriteOp::Delete);
        info!(user_id = %id, actor_id = ?actor.map(|a| a.id), "User deleted");
        Ok(())
    }

    /// 按邮箱查找（登录用）
    pub(crate) async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.repos.users.find_by_email(email).await
    }

    pub(crate) async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        self.repos.users.find_by_id(id).await
    }

    async fn check_profile_refs(&self, profile: &RoleProfile) -> AppResult<()> {
        match profile {
            RoleProfile::Admin => Ok(()),
            RoleProfile::Student { enrolled_grade, .. } => {
                if let Some(grade) = enrolled_grade {
                    references::ensure_grade(&self.repos, grade, "enrolledGrade").await?;
                }
                Ok(())
            }
            RoleProfile::Teacher {
                assigned_subjects,
                assigned_grades,
                ..
            } => {
                references::ensure_subjects(&self.repos, assigned_subjects, "assignedSubjects").await?;
                references::ensure_grades(&self.repos, assigned_grades, "assignedGrades").await
            }
        }
    }

    pub(crate) async fn view(&self, user: &User) -> AppResult<UserView> {
        let refs = References::load(&self.repos, &[], user.subject_refs(), &user.grade_refs()).await?;
        Ok(UserView::build(user, &refs))
    }

    async fn views(&self, users: &[User]) -> AppResult<Vec<UserView>> {
        let subject_ids: Vec<SubjectId> = users.iter().flat_map(|u| u.subject_refs().iter().copied()).collect();
        let grade_ids: Vec<GradeId> = users.iter().flat_map(|u| u.grade_refs()).collect();
        let refs = References::load(&self.repos, &[], &subject_ids, &grade_ids).await?;
        Ok(users.iter().map(|u| UserView::build(u, &refs)).collect())
    }
}
