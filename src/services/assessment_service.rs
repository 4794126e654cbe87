//! Assessment engine - Course final assessments, grading and the student
//! dashboard.
//!
//! Status is projected on every read from enrollment progress and attempt
//! history (see [`derive_status`]); nothing about it is stored. Every
//! submission appends an attempt, and a passing one triggers certificate
//! issuance.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::access::{owned_course, require_enrollment, with_current_progress};
use super::container::parallel;
use super::CertificateService;
use crate::config::{Config, ASSESSMENT_TITLE_SUFFIX};
use crate::domain::assessment::{
    derive_status, grade, AssessmentDashboardRow, AssessmentResponse, NewAttempt,
    SubmissionResult, TakeAssessmentResponse,
};
use crate::domain::{
    Assessment, AssessmentAttempt, AssessmentQuestion, AssessmentStatus, QuestionDraft,
    SubmittedAnswer,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait AssessmentService: Send + Sync {
    /// The course's single assessment, created empty on first request
    async fn get_or_create(&self, actor: Uuid, course_id: Uuid) -> AppResult<AssessmentResponse>;

    async fn update(
        &self,
        actor: Uuid,
        assessment_id: Uuid,
        title: Option<String>,
        passing_score: Option<f64>,
    ) -> AppResult<AssessmentResponse>;

    async fn add_question(
        &self,
        actor: Uuid,
        assessment_id: Uuid,
        draft: QuestionDraft,
    ) -> AppResult<AssessmentQuestion>;

    async fn delete_question(&self, actor: Uuid, question_id: Uuid) -> AppResult<()>;

    /// Questions for an enrolled student, without answer keys
    async fn take(&self, student_id: Uuid, assessment_id: Uuid)
        -> AppResult<TakeAssessmentResponse>;

    async fn submit(
        &self,
        student_id: Uuid,
        assessment_id: Uuid,
        answers: Vec<SubmittedAnswer>,
    ) -> AppResult<SubmissionResult>;

    /// One row per assessment of each course the student is enrolled in
    async fn dashboard(&self, student_id: Uuid) -> AppResult<Vec<AssessmentDashboardRow>>;

    async fn list_attempts(
        &self,
        student_id: Uuid,
        assessment_id: Uuid,
    ) -> AppResult<Vec<AssessmentAttempt>>;
}

pub struct AssessmentEngine<U: UnitOfWork> {
    uow: Arc<U>,
    certificates: Arc<dyn CertificateService>,
    config: Config,
}

impl<U: UnitOfWork> AssessmentEngine<U> {
    pub fn new(uow: Arc<U>, certificates: Arc<dyn CertificateService>, config: Config) -> Self {
        Self {
            uow,
            certificates,
            config,
        }
    }

    async fn find_assessment(&self, assessment_id: Uuid) -> AppResult<Assessment> {
        self.uow
            .assessments()
            .find_by_id(assessment_id)
            .await?
            .ok_or_not_found()
    }

    /// Load an assessment whose course the caller owns.
    async fn owned_assessment(&self, actor: Uuid, assessment_id: Uuid) -> AppResult<Assessment> {
        let assessment = self.find_assessment(assessment_id).await?;
        owned_course(self.uow.as_ref(), assessment.course_id, actor).await?;
        Ok(assessment)
    }

    /// Fail with `Forbidden` unless the student may sit the assessment now.
    async fn unlocked_for(
        &self,
        student_id: Uuid,
        assessment: &Assessment,
    ) -> AppResult<Vec<AssessmentAttempt>> {
        let enrollment =
            require_enrollment(self.uow.as_ref(), student_id, assessment.course_id).await?;
        let enrollment = with_current_progress(self.uow.as_ref(), enrollment).await?;
        let attempts = self
            .uow
            .assessments()
            .list_attempts(assessment.id, student_id)
            .await?;

        if derive_status(enrollment.progress, &attempts) == AssessmentStatus::Locked {
            return Err(AppError::forbidden(
                "Complete every lesson to unlock the assessment",
            ));
        }
        Ok(attempts)
    }

    async fn response(&self, assessment: Assessment) -> AppResult<AssessmentResponse> {
        let questions = self.uow.assessments().list_questions(assessment.id).await?;
        Ok(AssessmentResponse::new(assessment, questions))
    }
}

fn check_passing_score(score: f64) -> AppResult<()> {
    if !(0.0..=100.0).contains(&score) {
        return Err(AppError::validation(
            "Passing score must be between 0 and 100",
        ));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> AssessmentService for AssessmentEngine<U> {
    async fn get_or_create(&self, actor: Uuid, course_id: Uuid) -> AppResult<AssessmentResponse> {
        let course = owned_course(self.uow.as_ref(), course_id, actor).await?;

        let assessment = match self.uow.assessments().find_by_course(course_id).await? {
            Some(assessment) => assessment,
            None => {
                let assessment = self
                    .uow
                    .assessments()
                    .create_if_absent(
                        course_id,
                        format!("{}{}", course.title, ASSESSMENT_TITLE_SUFFIX),
                        self.config.default_passing_score,
                    )
                    .await?;
                tracing::info!(course_id = %course_id, assessment_id = %assessment.id, "Assessment created");
                assessment
            }
        };

        self.response(assessment).await
    }

    async fn update(
        &self,
        actor: Uuid,
        assessment_id: Uuid,
        title: Option<String>,
        passing_score: Option<f64>,
    ) -> AppResult<AssessmentResponse> {
        if let Some(score) = passing_score {
            check_passing_score(score)?;
        }
        let title = title.map(|title| title.trim().to_string());
        if title.as_deref() == Some("") {
            return Err(AppError::validation("Title is required"));
        }

        self.owned_assessment(actor, assessment_id).await?;
        let assessment = self
            .uow
            .assessments()
            .update(assessment_id, title, passing_score)
            .await?;
        self.response(assessment).await
    }

    async fn add_question(
        &self,
        actor: Uuid,
        assessment_id: Uuid,
        draft: QuestionDraft,
    ) -> AppResult<AssessmentQuestion> {
        let draft = draft.validated()?;
        self.owned_assessment(actor, assessment_id).await?;
        self.uow
            .assessments()
            .add_question(assessment_id, draft)
            .await
    }

    async fn delete_question(&self, actor: Uuid, question_id: Uuid) -> AppResult<()> {
        let question = self
            .uow
            .assessments()
            .find_question(question_id)
            .await?
            .ok_or_not_found()?;
        self.owned_assessment(actor, question.assessment_id).await?;
        self.uow.assessments().delete_question(question_id).await
    }

    async fn take(
        &self,
        student_id: Uuid,
        assessment_id: Uuid,
    ) -> AppResult<TakeAssessmentResponse> {
        let assessment = self.find_assessment(assessment_id).await?;
        self.unlocked_for(student_id, &assessment).await?;
        let questions = self.uow.assessments().list_questions(assessment_id).await?;

        Ok(TakeAssessmentResponse {
            id: assessment.id,
            course_id: assessment.course_id,
            title: assessment.title,
            passing_score: assessment.passing_score,
            questions: questions.into_iter().map(Into::into).collect(),
        })
    }

    async fn submit(
        &self,
        student_id: Uuid,
        assessment_id: Uuid,
        answers: Vec<SubmittedAnswer>,
    ) -> AppResult<SubmissionResult> {
        let assessment = self.find_assessment(assessment_id).await?;
        self.unlocked_for(student_id, &assessment).await?;

        let questions = self.uow.assessments().list_questions(assessment_id).await?;
        let outcome = grade(&questions, &answers, assessment.passing_score);

        let attempt = self
            .uow
            .assessments()
            .record_attempt(NewAttempt {
                assessment_id,
                student_id,
                answers,
                score: outcome.score,
                passed: outcome.passed,
            })
            .await?;

        tracing::info!(
            student_id = %student_id,
            assessment_id = %assessment_id,
            score = outcome.score,
            passed = outcome.passed,
            "Assessment attempt graded"
        );

        let certificate_id = if outcome.passed {
            let certificate = self
                .certificates
                .issue(student_id, assessment.course_id)
                .await?;
            Some(certificate.certificate_id)
        } else {
            None
        };

        Ok(SubmissionResult {
            attempt_id: attempt.id,
            score: outcome.score,
            passed: outcome.passed,
            correct_count: outcome.correct_count,
            total_questions: outcome.total_questions,
            passing_score: assessment.passing_score,
            certificate_id,
        })
    }

    async fn dashboard(&self, student_id: Uuid) -> AppResult<Vec<AssessmentDashboardRow>> {
        let enrollments = self.uow.enrollments().list_by_user(student_id).await?;
        if enrollments.is_empty() {
            return Ok(Vec::new());
        }
        let enrollments = parallel::join_all(
            enrollments
                .into_iter()
                .map(|enrollment| with_current_progress(self.uow.as_ref(), enrollment))
                .collect(),
        )
        .await?;
        let progress: HashMap<Uuid, i32> = enrollments
            .iter()
            .map(|enrollment| (enrollment.course_id, enrollment.progress))
            .collect();
        let course_ids: Vec<Uuid> = progress.keys().copied().collect();

        let (assessments, courses) = parallel::join2(
            self.uow.assessments().list_by_courses(course_ids.clone()),
            self.uow.courses().find_many(course_ids),
        )
        .await?;
        let titles: HashMap<Uuid, String> = courses
            .into_iter()
            .map(|course| (course.id, course.title))
            .collect();

        let rows = assessments.into_iter().map(|assessment| {
            let course_progress = progress.get(&assessment.course_id).copied().unwrap_or(0);
            let course_title = titles
                .get(&assessment.course_id)
                .cloned()
                .unwrap_or_default();
            async move {
                let attempts = self
                    .uow
                    .assessments()
                    .list_attempts(assessment.id, student_id)
                    .await?;
                let status = derive_status(course_progress, &attempts);

                let certificate_id = if status == AssessmentStatus::Completed {
                    self.uow
                        .certificates()
                        .find_by_user_course(student_id, assessment.course_id)
                        .await?
                        .map(|certificate| certificate.certificate_id)
                } else {
                    None
                };

                Ok::<_, AppError>(AssessmentDashboardRow {
                    assessment_id: assessment.id,
                    course_id: assessment.course_id,
                    course_title,
                    title: assessment.title,
                    passing_score: assessment.passing_score,
                    progress: course_progress,
                    status,
                    attempts: attempts.len(),
                    best_score: attempts.iter().map(|a| a.score).reduce(f64::max),
                    certificate_id,
                })
            }
        });

        parallel::join_all(rows.collect()).await
    }

    async fn list_attempts(
        &self,
        student_id: Uuid,
        assessment_id: Uuid,
    ) -> AppResult<Vec<AssessmentAttempt>> {
        self.find_assessment(assessment_id).await?;
        self.uow
            .assessments()
            .list_attempts(assessment_id, student_id)
            .await
    }
}
