//! 科目服务

use edu_common::dedup_preserving_order;
use edu_errors::AppResult;
use tracing::info;

use super::commands::{AddGradeCommand, CreateSubjectCommand, UpdateSubjectCommand};
use crate::application::references::{self, References};
use crate::application::views::SubjectView;
use crate::application::{Repositories, WriteOp, record_write};
use crate::domain::actor::{Actor, Role};
use crate::domain::ids::SubjectId;
use crate::domain::policy::{Action, PolicyEvaluator, ResourceKind, Target};
use crate::domain::subject::{Subject, SubjectPatch};
use crate::error::{RecordError, translate_conflict};

const KIND: ResourceKind = ResourceKind::Subject;

/// 科目服务
#[derive(Clone)]
pub struct SubjectService {
    repos: Repositories,
}

impl SubjectService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        actor: Option<&Actor>,
        cmd: CreateSubjectCommand,
    ) -> AppResult<SubjectView> {
        PolicyEvaluator::decide(actor, Action::Create, KIND, None).into_result()?;

        let name = Subject::validate_name(&cmd.name)?;
        let code = Subject::normalize_code(&cmd.code)?;
        let description = Subject::normalize_description(cmd.description.as_deref());
        if let Some(teacher) = &cmd.teacher {
            references::ensure_user(&self.repos, teacher, Role::Teacher, "teacher").await?;
        }
        references::ensure_grades(&self.repos, &cmd.grades, "grades").await?;

        let subject = Subject::new(name, code, description, cmd.teacher, cmd.grades);
        self.repos
            .subjects
            .create(&subject)
            .await
            .map_err(|e| translate_conflict(e, || RecordError::SubjectCodeExists(subject.code.clone())))?;

        record_write(KIND, WriteOp::Create);
        info!(
            subject_id = %subject.id,
            code = %subject.code,
            actor_id = ?actor.map(|a| a.id),
            "Subject created"
        );

        self.view(&subject).await
    }

    pub async fn get(&self, actor: Option<&Actor>, id: &SubjectId) -> AppResult<SubjectView> {
        PolicyEvaluator::precheck(actor, Action::Read, KIND).into_result()?;

        let subject = self.load(id).await?;
        PolicyEvaluator::decide(actor, Action::Read, KIND, Some(&Target::Subject))
            .into_result()?;

        self.view(&subject).await
    }

    pub async fn list(&self, actor: Option<&Actor>) -> AppResult<Vec<SubjectView>> {
        PolicyEvaluator::authorize_list(actor, KIND)?;

        let subjects = self.repos.subjects.list().await?;
        let teacher_ids: Vec<_> = subjects.iter().filter_map(|s| s.teacher).collect();
        let grade_ids: Vec<_> = subjects.iter().flat_map(|s| s.grades.iter().copied()).collect();
        let refs = References::load(&self.repos, &teacher_ids, &[], &grade_ids).await?;

        Ok(subjects.iter().map(|s| SubjectView::build(s, &refs)).collect())
    }

    pub async fn update(
        &self,
        actor: Option<&Actor>,
        id: &SubjectId,
        cmd: UpdateSubjectCommand,
    ) -> AppResult<SubjectView> {
        PolicyEvaluator::precheck(actor, Action::Update, KIND).into_result()?;

        self.load(id).await?;
        PolicyEvaluator::decide(actor, Action::Update, KIND, Some(&Target::Subject))
            .into_result()?;

        let mut patch = SubjectPatch::default();
        if let Some(name) = &cmd.name {
            patch.name = Some(Subject::validate_name(name)?);
        }
        if let Some(code) = &cmd.code {
            patch.code = Some(Subject::normalize_code(code)?);
        }
        if let Some(description) = &cmd.description {
            patch.description = Some(Subject::normalize_description(description.as_deref()));
        }
        if let Some(teacher) = cmd.teacher {
            if let Some(teacher) = &teacher {
                references::ensure_user(&self.repos, teacher, Role::Teacher, "teacher").await?;
            }
            patch.teacher = Some(teacher);
        }
        if let Some(grades) = cmd.grades {
            references::ensure_grades(&self.repos, &grades, "grades").await?;
            patch.grades = Some(dedup_preserving_order(&grades));
        }

        // 代码冲突只可能来自补丁中的新代码
        let subject = self
            .repos
            .subjects
            .update(id, &patch)
            .await
            .map_err(|e| {
                translate_conflict(e, || {
                    RecordError::SubjectCodeExists(patch.code.clone().unwrap_or_default())
                })
            })?
            .ok_or(RecordError::SubjectNotFound)?;

        record_write(KIND, WriteOp::Update);
        info!(subject_id = %subject.id, actor_id = ?actor.map(|a| a.id), "Subject updated");

        self.view(&subject).await
    }

    pub async fn delete(&self, actor: Option<&Actor>, id: &SubjectId) -> AppResult<()> {
        PolicyEvaluator::decide(actor, Action::Delete, KIND, Some(&Target::Subject))
            .into_result()?;

        if !self.repos.subjects.delete(id).await? {
            return Err(RecordError::SubjectNotFound.into());
        }

        record_write(KIND, WriteOp::Delete);
        info!(subject_id = %id, actor_id = ?actor.map(|a| a.id), "Subject deleted");
        Ok(())
    }

    /// 将班级加入科目；重复加入不产生重复项
    pub async fn add_grade(
        &self,
        actor: Option<&Actor>,
        id: &SubjectId,
        cmd: AddGradeCommand,
    ) -> AppResult<SubjectView> {
        PolicyEvaluator::decide(actor, Action::Update, KIND, Some(&Target::Subject))
            .into_result()?;

        references::ensure_grade(&self.repos, &cmd.grade_id, "gradeId").await?;

        let subject = self
            .repos
            .subjects
            .add_grade(id, &cmd.grade_id)
            .await?
            .ok_or(RecordError::SubjectNotFound)?;

        record_write(KIND, WriteOp::Enroll);
        info!(subject_id = %id, grade_id = %cmd.grade_id, "Grade added to subject");

        self.view(&subject).await
    }

    async fn load(&self, id: &SubjectId) -> AppResult<Subject> {
        self.repos
            .subjects
            .find_by_id(id)
            .await?
            .ok_or_else(|| RecordError::SubjectNotFound.into())
    }

    async fn view(&self, subject: &Subject) -> AppResult<SubjectView> {
        let teacher_ids: Vec<_> = subject.teacher.into_iter().collect();
        let refs = References::load(&self.repos, &teacher_ids, &[], &subject.grades).await?;
        Ok(SubjectView::build(subject, &refs))
    }
}
