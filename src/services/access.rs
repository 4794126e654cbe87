//! Authorization checks shared by the course-scoped services.

use uuid::Uuid;

use crate::domain::{Course, Enrollment};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Load a course the caller must own.
pub(crate) async fn owned_course<U: UnitOfWork>(
    uow: &U,
    course_id: Uuid,
    actor: Uuid,
) -> AppResult<Course> {
    let course = uow.courses().find_by_id(course_id).await?.ok_or_not_found()?;
    course.ensure_owner(actor)?;
    Ok(course)
}

/// Fetch the caller's enrollment, failing with `Forbidden` when absent.
pub(crate) async fn require_enrollment<U: UnitOfWork>(
    uow: &U,
    user_id: Uuid,
    course_id: Uuid,
) -> AppResult<Enrollment> {
    uow.enrollments()
        .find(user_id, course_id)
        .await?
        .ok_or_else(|| AppError::forbidden("You are not enrolled in this course"))
}

/// Bring an enrollment's completed set and progress in line with the
/// course's current lessons, storing the progress when it drifted.
pub(crate) async fn with_current_progress<U: UnitOfWork>(
    uow: &U,
    mut enrollment: Enrollment,
) -> AppResult<Enrollment> {
    let lesson_ids: Vec<Uuid> = uow
        .lessons()
        .list_by_course(enrollment.course_id)
        .await?
        .into_iter()
        .map(|lesson| lesson.id)
        .collect();

    if enrollment.sync_with_curriculum(&lesson_ids) {
        uow.enrollments()
            .set_progress(enrollment.id, enrollment.progress)
            .await?;
    }
    Ok(enrollment)
}

/// Owner or enrolled student; anyone else only sees preview material.
pub(crate) async fn can_read_course<U: UnitOfWork>(
    uow: &U,
    course: &Course,
    viewer: Option<Uuid>,
) -> AppResult<bool> {
    match viewer {
        Some(viewer) if course.is_owned_by(viewer) => Ok(true),
        Some(viewer) => Ok(uow.enrollments().find(viewer, course.id).await?.is_some()),
        None => Ok(false),
    }
}
