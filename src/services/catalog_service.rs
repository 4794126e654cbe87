//! Catalog service - Courses, lessons and instructor media.
//!
//! Unpublished courses are visible to their instructor only. Lesson bodies
//! are gated: preview lessons are public, the rest require ownership or an
//! enrollment.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::access::{can_read_course, owned_course};
use crate::domain::course::{
    curriculum_order, CourseChanges, LessonChanges, LessonResponse, NewCourse, NewLesson,
};
use crate::domain::{Course, CourseStatus, Lesson};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::external::{MediaHost, Summarizer, UploadedMedia};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn create_course(&self, new_course: NewCourse) -> AppResult<Course>;

    async fn update_course(
        &self,
        actor: Uuid,
        course_id: Uuid,
        changes: CourseChanges,
    ) -> AppResult<Course>;

    /// Move a course between `published` and `unpublished`
    async fn set_published(&self, actor: Uuid, course_id: Uuid, publish: bool)
        -> AppResult<Course>;

    async fn delete_course(&self, actor: Uuid, course_id: Uuid) -> AppResult<()>;

    /// Published courses, newest first, with the total count
    async fn list_published(&self, params: PaginationParams) -> AppResult<(Vec<Course>, u64)>;

    async fn list_instructor_courses(&self, instructor_id: Uuid) -> AppResult<Vec<Course>>;

    async fn get_course(&self, viewer: Option<Uuid>, course_id: Uuid) -> AppResult<Course>;

    async fn create_lesson(&self, actor: Uuid, new_lesson: NewLesson) -> AppResult<Lesson>;

    async fn update_lesson(
        &self,
        actor: Uuid,
        lesson_id: Uuid,
        changes: LessonChanges,
    ) -> AppResult<Lesson>;

    async fn delete_lesson(&self, actor: Uuid, lesson_id: Uuid) -> AppResult<()>;

    /// Curriculum in order, bodies withheld where the viewer may not read them
    async fn list_lessons(
        &self,
        viewer: Option<Uuid>,
        course_id: Uuid,
    ) -> AppResult<Vec<LessonResponse>>;

    /// Full lesson; `Forbidden` for non-preview lessons the viewer cannot read
    async fn get_lesson(&self, viewer: Uuid, lesson_id: Uuid) -> AppResult<LessonResponse>;

    async fn summarize_lesson(&self, viewer: Uuid, lesson_id: Uuid) -> AppResult<String>;

    async fn upload_media(&self, bytes: Vec<u8>, content_type: String)
        -> AppResult<UploadedMedia>;
}

pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
    media: Arc<dyn MediaHost>,
    summarizer: Arc<dyn Summarizer>,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>, media: Arc<dyn MediaHost>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            uow,
            media,
            summarizer,
        }
    }

    async fn readable_lesson(&self, viewer: Uuid, lesson_id: Uuid) -> AppResult<Lesson> {
        let lesson = self
            .uow
            .lessons()
            .find_by_id(lesson_id)
            .await?
            .ok_or_not_found()?;
        if lesson.is_preview {
            return Ok(lesson);
        }

        let course = self
            .uow
            .courses()
            .find_by_id(lesson.course_id)
            .await?
            .ok_or_not_found()?;
        if !can_read_course(self.uow.as_ref(), &course, Some(viewer)).await? {
            return Err(AppError::forbidden(
                "Enroll in the course to access this lesson",
            ));
        }
        Ok(lesson)
    }
}

fn check_price(price: i64) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::validation("Price cannot be negative"));
    }
    Ok(())
}

fn check_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    Ok(())
}

fn is_supported_media(content_type: &str) -> bool {
    content_type.starts_with("image/")
        || content_type.starts_with("video/")
        || content_type == "application/pdf"
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn create_course(&self, new_course: NewCourse) -> AppResult<Course> {
        check_title(&new_course.title)?;
        check_price(new_course.price)?;

        let course = self.uow.courses().create(new_course).await?;
        tracing::info!(course_id = %course.id, instructor_id = %course.instructor_id, "Course created");
        Ok(course)
    }

    async fn update_course(
        &self,
        actor: Uuid,
        course_id: Uuid,
        changes: CourseChanges,
    ) -> AppResult<Course> {
        if let Some(title) = &changes.title {
            check_title(title)?;
        }
        if let Some(price) = changes.price {
            check_price(price)?;
        }

        owned_course(self.uow.as_ref(), course_id, actor).await?;
        self.uow.courses().update(course_id, changes).await
    }

    async fn set_published(
        &self,
        actor: Uuid,
        course_id: Uuid,
        publish: bool,
    ) -> AppResult<Course> {
        owned_course(self.uow.as_ref(), course_id, actor).await?;
        let status = if publish {
            CourseStatus::Published
        } else {
            CourseStatus::Unpublished
        };

        let course = self.uow.courses().set_status(course_id, status).await?;
        tracing::info!(course_id = %course_id, status = %status, "Course status changed");
        Ok(course)
    }

    async fn delete_course(&self, actor: Uuid, course_id: Uuid) -> AppResult<()> {
        owned_course(self.uow.as_ref(), course_id, actor).await?;
        self.uow.courses().delete(course_id).await?;
        tracing::info!(course_id = %course_id, "Course deleted");
        Ok(())
    }

    async fn list_published(&self, params: PaginationParams) -> AppResult<(Vec<Course>, u64)> {
        self.uow.courses().list_published(params).await
    }

    async fn list_instructor_courses(&self, instructor_id: Uuid) -> AppResult<Vec<Course>> {
        self.uow.courses().list_by_instructor(instructor_id).await
    }

    async fn get_course(&self, viewer: Option<Uuid>, course_id: Uuid) -> AppResult<Course> {
        let course = self
            .uow
            .courses()
            .find_by_id(course_id)
            .await?
            .ok_or_not_found()?;

        let is_owner = viewer.is_some_and(|viewer| course.is_owned_by(viewer));
        if !course.is_published() && !is_owner {
            return Err(AppError::NotFound);
        }
        Ok(course)
    }

    async fn create_lesson(&self, actor: Uuid, new_lesson: NewLesson) -> AppResult<Lesson> {
        check_title(&new_lesson.title)?;
        if new_lesson.duration_minutes < 0 {
            return Err(AppError::validation("Duration cannot be negative"));
        }
        owned_course(self.uow.as_ref(), new_lesson.course_id, actor).await?;

        let lesson = self.uow.lessons().create(new_lesson).await?;
        tracing::info!(lesson_id = %lesson.id, course_id = %lesson.course_id, "Lesson created");
        Ok(lesson)
    }

    async fn update_lesson(
        &self,
        actor: Uuid,
        lesson_id: Uuid,
        changes: LessonChanges,
    ) -> AppResult<Lesson> {
        if let Some(title) = &changes.title {
            check_title(title)?;
        }
        let lesson = self
            .uow
            .lessons()
            .find_by_id(lesson_id)
            .await?
            .ok_or_not_found()?;
        owned_course(self.uow.as_ref(), lesson.course_id, actor).await?;

        self.uow.lessons().update(lesson_id, changes).await
    }

    async fn delete_lesson(&self, actor: Uuid, lesson_id: Uuid) -> AppResult<()> {
        let lesson = self
            .uow
            .lessons()
            .find_by_id(lesson_id)
            .await?
            .ok_or_not_found()?;
        owned_course(self.uow.as_ref(), lesson.course_id, actor).await?;

        self.uow.lessons().delete(lesson_id).await?;
        tracing::info!(lesson_id = %lesson_id, course_id = %lesson.course_id, "Lesson deleted");
        Ok(())
    }

    async fn list_lessons(
        &self,
        viewer: Option<Uuid>,
        course_id: Uuid,
    ) -> AppResult<Vec<LessonResponse>> {
        let course = self.get_course(viewer, course_id).await?;
        let can_read = can_read_course(self.uow.as_ref(), &course, viewer).await?;

        let mut lessons = self.uow.lessons().list_by_course(course_id).await?;
        curriculum_order(&mut lessons);

        Ok(lessons
            .into_iter()
            .map(|lesson| LessonResponse::for_viewer(lesson, can_read))
            .collect())
    }

    async fn get_lesson(&self, viewer: Uuid, lesson_id: Uuid) -> AppResult<LessonResponse> {
        let lesson = self.readable_lesson(viewer, lesson_id).await?;
        Ok(LessonResponse::full(lesson))
    }

    async fn summarize_lesson(&self, viewer: Uuid, lesson_id: Uuid) -> AppResult<String> {
        let lesson = self.readable_lesson(viewer, lesson_id).await?;
        if lesson.content.trim().is_empty() {
            return Err(AppError::bad_request("Lesson has no content to summarize"));
        }
        self.summarizer.summarize(lesson.content).await
    }

    async fn upload_media(
        &self,
        bytes: Vec<u8>,
        content_type: String,
    ) -> AppResult<UploadedMedia> {
        if bytes.is_empty() {
            return Err(AppError::bad_request("Upload body is empty"));
        }
        if !is_supported_media(&content_type) {
            return Err(AppError::validation(format!(
                "Unsupported media type '{}'",
                content_type
            )));
        }
        self.media.upload(bytes, content_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_types() {
        assert!(is_supported_media("image/png"));
        assert!(is_supported_media("video/mp4"));
        assert!(is_supported_media("application/pdf"));
        assert!(!is_supported_media("application/x-sh"));
    }

    #[test]
    fn test_negative_price_rejected() {
        assert!(check_price(-1).is_err());
        assert!(check_price(0).is_ok());
    }
}
