//! 班级服务

use edu_common::dedup_preserving_order;
use edu_errors::AppResult;
use tracing::info;

use super::commands::{AddStudentCommand, CreateGradeCommand, UpdateGradeCommand};
use crate::application::references::{self, References};
use crate::application::views::GradeView;
use crate::application::{Repositories, WriteOp, record_write};
use crate::domain::actor::{Actor, Role};
use crate::domain::grade::{Grade, GradePatch};
use crate::domain::ids::GradeId;
use crate::domain::policy::{Action, PolicyEvaluator, ResourceKind, Target};
use crate::error::RecordError;

const KIND: ResourceKind = ResourceKind::Grade;

/// 班级服务
#[derive(Clone)]
pub struct GradeService {
    repos: Repositories,
}

impl GradeService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(&self, actor: Option<&Actor>, cmd: CreateGradeCommand) -> AppResult<GradeView> {
        PolicyEvaluator::decide(actor, Action::Create, KIND, None).into_result()?;

        let name = Grade::validate_name(&cmd.name)?;
        let level = Grade::validate_level(cmd.level)?;
        let section = Grade::validate_section(&cmd.section)?;
        references::ensure_users(&self.repos, &cmd.students, Role::Student, "students").await?;
        references::ensure_subjects(&self.repos, &cmd.subjects, "subjects").await?;
        if let Some(teacher) = &cmd.class_teacher {
            references::ensure_user(&self.repos, teacher, Role::Teacher, "classTeacher").await?;
        }

        let grade = Grade::new(name, level, section, cmd.students, cmd.subjects, cmd.class_teacher);
        self.repos.grades.create(&grade).await?;

        record_write(KIND, WriteOp::Create);
        info!(grade_id = %grade.id, actor_id = ?actor.map(|a| a.id), "Grade created");

        self.view(&grade).await
    }

    pub async fn get(&self, actor: Option<&Actor>, id: &GradeId) -> AppResult<GradeView> {
        PolicyEvaluator::precheck(actor, Action::Read, KIND).into_result()?;

        let grade = self.load(id).await?;
        PolicyEvaluator::decide(actor, Action::Read, KIND, Some(&Target::Grade)).into_result()?;

        self.view(&grade).await
    }

    pub async fn list(&self, actor: Option<&Actor>) -> AppResult<Vec<GradeView>> {
        PolicyEvaluator::authorize_list(actor, KIND)?;

        let grades = self.repos.grades.list().await?;
        let user_ids: Vec<_> = grades
            .iter()
            .flat_map(|g| g.students.iter().copied().chain(g.class_teacher))
            .collect();
        let subject_ids: Vec<_> = grades.iter().flat_map(|g| g.subjects.iter().copied()).collect();
        let refs = References::load(&self.repos, &user_ids, &subject_ids, &[]).await?;

        Ok(grades.iter().map(|g| GradeView::build(g, &refs)).collect())
    }

    pub async fn update(
        &self,
        actor: Option<&Actor>,
        id: &GradeId,
        cmd: UpdateGradeCommand,
    ) -> AppResult<GradeView> {
        PolicyEvaluator::precheck(actor, Action::Update, KIND).into_result()?;

        self.load(id).await?;
        PolicyEvaluator::decide(actor, Action::Update, KIND, Some(&Target::Grade)).into_result()?;

        let mut patch = GradePatch::default();
        if let Some(name) = &cmd.name {
            patch.name = Some(Grade::validate_name(name)?);
        }
        if let Some(level) = cmd.level {
            patch.level = Some(Grade::validate_level(level)?);
        }
        if let Some(section) = &cmd.section {
            patch.section = Some(Grade::validate_section(section)?);
        }
        if let Some(students) = cmd.students {
            references::ensure_users(&self.repos, &students, Role::Student, "students").await?;
            patch.students = Some(dedup_preserving_order(&students));
        }
        if let Some(subjects) = cmd.subjects {
            references::ensure_subjects(&self.repos, &subjects, "subjects").await?;
            patch.subjects = Some(dedup_preserving_order(&subjects));
        }
        if let Some(class_teacher) = cmd.class_teacher {
            if let Some(teacher) = &class_teacher {
                references::ensure_user(&self.repos, teacher, Role::Teacher, "classTeacher").await?;
            }
            patch.class_teacher = Some(class_teacher);
        }

        // 只写入请求给出的字段，并发的 add_student 不会被覆盖
        let grade = self
            .repos
            .grades
            .update(id, &patch)
            .await?
            .ok_or(RecordError::GradeNotFound)?;

        record_write(KIND, WriteOp::Update);
        info!(grade_id = %grade.id, actor_id = ?actor.map(|a| a.id), "Grade updated");

        self.view(&grade).await
    }

    pub async fn delete(&self, actor: Option<&Actor>, id: &GradeId) -> AppResult<()> {
        PolicyEvaluator::decide(actor, Action::Delete, KIND, Some(&Target::Grade)).into_result()?;

        if !self.repos.grades.delete(id).await? {
            return Err(RecordError::GradeNotFound.into());
        }

        record_write(KIND, WriteOp::Delete);
        info!(grade_id = %id, actor_id = ?actor.map(|a| a.id), "Grade deleted");
        Ok(())
    }

    /// 将学生加入班级；重复加入不产生重复项
    pub async fn add_student(
        &self,
        actor: Option<&Actor>,
        id: &GradeId,
        cmd: AddStudentCommand,
    ) -> AppResult<GradeView> {
        PolicyEvaluator::decide(actor, Action::Update, KIND, Some(&Target::Grade)).into_result()?;

        references::ensure_user(&self.repos, &cmd.student_id, Role::Student, "studentId").await?;

        let grade = self
            .repos
            .grades
            .add_student(id, &cmd.student_id)
            .await?
            .ok_or(RecordError::GradeNotFound)?;

        record_write(KIND, WriteOp::Enroll);
        info!(grade_id = %id, student_id = %cmd.student_id, "Student added to grade");

        self.view(&grade).await
    }

    async fn load(&self, id: &GradeId) -> AppResult<Grade> {
        self.repos
            .grades
            .find_by_id(id)
            .await?
            .ok_or_else(|| RecordError::GradeNotFound.into())
    }

    async fn view(&self, grade: &Grade) -> AppResult<GradeView> {
        let user_ids: Vec<_> = grade.students.iter().copied().chain(grade.class_teacher).collect();
        let refs = References::load(&self.repos, &user_ids, &grade.subjects, &[]).await?;
        Ok(GradeView::build(grade, &refs))
    }
}
