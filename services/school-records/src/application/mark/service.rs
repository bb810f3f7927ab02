//! 成绩服务

use edu_common::UserId;
use edu_errors::AppResult;
use tracing::{info, warn};

use super::commands::{CreateMarkCommand, UpdateMarkCommand};
use crate::application::references::{self, References};
use crate::application::views::MarkView;
use crate::application::{Repositories, WriteOp, record_write};
use crate::domain::actor::{Actor, Role};
use crate::domain::ids::MarkId;
use crate::domain::mark::{ExamType, Mark, MarkFilter};
use crate::domain::policy::{Action, DenyReason, PolicyEvaluator, ResourceKind, Scope, Target};
use crate::error::{RecordError, translate_conflict};

const KIND: ResourceKind = ResourceKind::Mark;

fn already_exists(mark: &Mark) -> RecordError {
    RecordError::MarkAlreadyExists {
        student: mark.student,
        subject: mark.subject,
        exam_type: mark.exam_type,
        exam_date: mark.exam_date,
    }
}

/// 成绩服务
#[derive(Clone)]
pub struct MarkService {
    repos: Repositories,
}

impl MarkService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// 录入成绩；教师字段强制为当前主体
    pub async fn create(&self, actor: Option<&Actor>, cmd: CreateMarkCommand) -> AppResult<MarkView> {
        let actor = PolicyEvaluator::authorize(actor, Action::Create, KIND, None)?;

        let marks = Mark::validate_marks(cmd.marks)?;
        let exam_type: ExamType = cmd.exam_type.trim().parse()?;
        let exam_date = Mark::parse_exam_date(&cmd.exam_date)?;
        let remarks = Mark::normalize_remarks(cmd.remarks.as_deref());
        references::ensure_user(&self.repos, &cmd.student, Role::Student, "student").await?;
        references::ensure_subject(&self.repos, &cmd.subject, "subject").await?;
        references::ensure_grade(&self.repos, &cmd.grade, "grade").await?;

        let mark = Mark::new(
            cmd.student,
            cmd.subject,
            cmd.grade,
            actor.id,
            marks,
            exam_type,
            exam_date,
            remarks,
        );

        self.repos
            .marks
            .create(&mark)
            .await
            .map_err(|e| translate_conflict(e, || already_exists(&mark)))?;

        record_write(KIND, WriteOp::Create);
        info!(
            mark_id = %mark.id,
            student_id = %mark.student,
            teacher_id = %mark.teacher,
            exam_type = %mark.exam_type,
            "Mark created"
        );

        self.view(&mark).await
    }

    pub async fn get(&self, actor: Option<&Actor>, id: &MarkId) -> AppResult<MarkView> {
        PolicyEvaluator::precheck(actor, Action::Read, KIND).into_result()?;

        let mark = self.load(id).await?;
        PolicyEvaluator::decide(actor, Action::Read, KIND, Some(&Target::mark(&mark))).into_result()?;

        self.view(&mark).await
    }

    /// 按主体可见范围列出成绩，考试日期倒序
    pub async fn list(&self, actor: Option<&Actor>) -> AppResult<Vec<MarkView>> {
        let filter = match PolicyEvaluator::authorize_list(actor, KIND)? {
            Scope::All => MarkFilter::default(),
            Scope::Student(id) => MarkFilter {
                student: Some(id),
                teacher: None,
            },
            Scope::Teacher(id) => MarkFilter {
                student: None,
                teacher: Some(id),
            },
        };

        let marks = self.repos.marks.list(filter).await?;
        self.views(&marks).await
    }

    /// 某个学生的成绩，与主体的可见范围取交集
    pub async fn list_by_student(
        &self,
        actor: Option<&Actor>,
        student: &UserId,
    ) -> AppResult<Vec<MarkView>> {
        let filter = match PolicyEvaluator::authorize_list(actor, KIND)? {
            Scope::All => MarkFilter {
                student: Some(*student),
                teacher: None,
            },
            Scope::Teacher(id) => MarkFilter {
                student: Some(*student),
                teacher: Some(id),
            },
            Scope::Student(id) if id == *student => MarkFilter {
                student: Some(id),
                teacher: None,
            },
            Scope::Student(id) => {
                warn!(actor_id = %id, student_id = %student, "Student requested another student's marks");
                return Err(DenyReason::Forbidden.into_error());
            }
        };

        let marks = self.repos.marks.list(filter).await?;
        self.views(&marks).await
    }

    pub async fn update(
        &self,
        actor: Option<&Actor>,
        id: &MarkId,
        cmd: UpdateMarkCommand,
    ) -> AppResult<MarkView> {
        PolicyEvaluator::precheck(actor, Action::Update, KIND).into_result()?;

        let mut mark = self.load(id).await?;
        PolicyEvaluator::decide(actor, Action::Update, KIND, Some(&Target::mark(&mark)))
            .into_result()?;

        if let Some(marks) = cmd.marks {
            mark.marks = Mark::validate_marks(marks)?;
        }
        if let Some(exam_type) = &cmd.exam_type {
            mark.exam_type = exam_type.trim().parse()?;
        }
        if let Some(exam_date) = &cmd.exam_date {
            mark.exam_date = Mark::parse_exam_date(exam_date)?;
        }
        if let Some(remarks) = &cmd.remarks {
            mark.remarks = Mark::normalize_remarks(remarks.as_deref());
        }
        if let Some(student) = cmd.student {
            references::ensure_user(&self.repos, &student, Role::Student, "student").await?;
            mark.student = student;
        }
        if let Some(subject) = cmd.subject {
            references::ensure_subject(&self.repos, &subject, "subject").await?;
            mark.subject = subject;
        }
        if let Some(grade) = cmd.grade {
            references::ensure_grade(&self.repos, &grade, "grade").await?;
            mark.grade = grade;
        }
        mark.audit_info.touch();

        // 唯一性由存储层在更新时重新检查
        let updated = self
            .repos
            .marks
            .update(&mark)
            .await
            .map_err(|e| translate_conflict(e, || already_exists(&mark)))?;
        if !updated {
            return Err(RecordError::MarkNotFound.into());
        }

        record_write(KIND, WriteOp::Update);
        info!(mark_id = %mark.id, actor_id = ?actor.map(|a| a.id), "Mark updated");

        self.view(&mark).await
    }

    pub async fn delete(&self, actor: Option<&Actor>, id: &MarkId) -> AppResult<()> {
        PolicyEvaluator::precheck(actor, Action::Delete, KIND).into_result()?;

        let mark = self.load(id).await?;
        PolicyEvaluator::decide(actor, Action::Delete, KIND, Some(&Target::mark(&mark)))
            .into_result()?;

        if !self.repos.marks.delete(id).await? {
            return Err(RecordError::MarkNotFound.into());
        }

        record_write(KIND, WriteOp::Delete);
        info!(mark_id = %id, actor_id = ?actor.map(|a| a.id), "Mark deleted");
        Ok(())
    }

    async fn load(&self, id: &MarkId) -> AppResult<Mark> {
        self.repos
            .marks
            .find_by_id(id)
            .await?
            .ok_or_else(|| RecordError::MarkNotFound.into())
    }

    async fn view(&self, mark: &Mark) -> AppResult<MarkView> {
        let refs = References::load(
            &self.repos,
            &[mark.student, mark.teacher],
            &[mark.subject],
            &[mark.grade],
        )
        .await?;
        Ok(MarkView::build(mark, &refs))
    }

    async fn views(&self, marks: &[Mark]) -> AppResult<Vec<MarkView>> {
        let user_ids: Vec<_> = marks.iter().flat_map(|m| [m.student, m.teacher]).collect();
        let subject_ids: Vec<_> = marks.iter().map(|m| m.subject).collect();
        let grade_ids: Vec<_> = marks.iter().map(|m| m.grade).collect();
        let refs = References::load(&self.repos, &user_ids, &subject_ids, &grade_ids).await?;
        Ok(marks.iter().map(|m| MarkView::build(m, &refs)).collect())
    }
}
