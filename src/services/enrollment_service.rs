//! Enrollment tracker - Lesson completion and course progress.
//!
//! Marking a lesson complete creates the enrollment on first use when the
//! course is open for free enrollment; paid courses need a verified
//! payment first. The completed set is stored as rows keyed by
//! (enrollment, lesson), so a repeated completion is absorbed by the
//! storage layer. Progress is recomputed from the set against the course's
//! current lessons on every read, so lessons added or removed later are
//! reflected without another completion.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::access::with_current_progress;
use crate::config::Config;
use crate::domain::enrollment::EnrollmentResponse;
use crate::domain::{Course, Enrollment, ProgressResponse};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait EnrollmentService: Send + Sync {
    /// Idempotently add a lesson to the completed set and refresh progress
    async fn mark_lesson_complete(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> AppResult<ProgressResponse>;

    /// Never fails for a missing enrollment; reports 0% instead
    async fn get_progress(&self, user_id: Uuid, course_id: Uuid) -> AppResult<ProgressResponse>;

    /// Enroll in a published course priced at zero
    async fn enroll_free(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Enrollment>;

    async fn list_enrollments(&self, user_id: Uuid) -> AppResult<Vec<EnrollmentResponse>>;
}

pub struct EnrollmentTracker<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> EnrollmentTracker<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    fn accepts_free_enrollment(&self, course: &Course) -> bool {
        self.config.free_enrollment_enabled && course.is_published() && course.is_free()
    }
}

#[async_trait]
impl<U: UnitOfWork> EnrollmentService for EnrollmentTracker<U> {
    async fn mark_lesson_complete(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> AppResult<ProgressResponse> {
        let lesson = self
            .uow
            .lessons()
            .find_by_id(lesson_id)
            .await?
            .ok_or_not_found()?;
        if lesson.course_id != course_id {
            return Err(AppError::bad_request(
                "Lesson does not belong to this course",
            ));
        }

        let mut enrollment = match self.uow.enrollments().find(user_id, course_id).await? {
            Some(enrollment) => enrollment,
            None => {
                let course = self
                    .uow
                    .courses()
                    .find_by_id(course_id)
                    .await?
                    .ok_or_not_found()?;
                if !self.accepts_free_enrollment(&course) {
                    return Err(AppError::forbidden("You are not enrolled in this course"));
                }
                self.uow.enrollments().ensure(user_id, course_id).await?
            }
        };
        enrollment.completed_lessons = self
            .uow
            .enrollments()
            .add_completed_lesson(enrollment.id, lesson_id)
            .await?;
        let enrollment = with_current_progress(self.uow.as_ref(), enrollment).await?;
        let progress = enrollment.progress;

        tracing::info!(
            user_id = %user_id,
            course_id = %course_id,
            lesson_id = %lesson_id,
            progress,
            "Lesson completed"
        );

        Ok(ProgressResponse::from(enrollment))
    }

    async fn get_progress(&self, user_id: Uuid, course_id: Uuid) -> AppResult<ProgressResponse> {
        match self.uow.enrollments().find(user_id, course_id).await? {
            Some(enrollment) => Ok(with_current_progress(self.uow.as_ref(), enrollment)
                .await?
                .into()),
            None => Ok(ProgressResponse::empty(course_id)),
        }
    }

    async fn enroll_free(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Enrollment> {
        if !self.config.free_enrollment_enabled {
            return Err(AppError::forbidden("Free enrollment is disabled"));
        }

        let course = self
            .uow
            .courses()
            .find_by_id(course_id)
            .await?
            .ok_or_not_found()?;
        if !course.is_published() {
            return Err(AppError::NotFound);
        }
        if !course.is_free() {
            return Err(AppError::bad_request(
                "This course requires payment before enrollment",
            ));
        }

        self.uow.enrollments().ensure(user_id, course_id).await
    }

    async fn list_enrollments(&self, user_id: Uuid) -> AppResult<Vec<EnrollmentResponse>> {
        let mut enrollments = Vec::new();
        for enrollment in self.uow.enrollments().list_by_user(user_id).await? {
            enrollments.push(with_current_progress(self.uow.as_ref(), enrollment).await?);
        }
        let course_ids = enrollments.iter().map(|e| e.course_id).collect();
        let titles: HashMap<Uuid, String> = self
            .uow
            .courses()
            .find_many(course_ids)
            .await?
            .into_iter()
            .map(|course| (course.id, course.title))
            .collect();

        Ok(enrollments
            .into_iter()
            .map(|enrollment| EnrollmentResponse {
                id: enrollment.id,
                course_title: titles
                    .get(&enrollment.course_id)
                    .cloned()
                    .unwrap_or_default(),
                course_id: enrollment.course_id,
                progress: enrollment.progress,
                completed_lessons: enrollment.completed_lessons.len(),
                enrolled_at: enrollment.enrolled_at,
            })
            .collect())
    }
}
