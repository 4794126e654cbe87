//! Enrollment and lesson-progress handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::enrollment::EnrollmentResponse;
use crate::domain::ProgressResponse;
use crate::errors::AppResult;
use crate::types::Created;

/// Routes mounted under `/enrollments`; all require authentication
pub fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/mine", get(my_enrollments))
        .route("/:course_id", post(enroll_free))
        .route("/:course_id/progress", get(get_progress))
        .route(
            "/:course_id/lessons/:lesson_id/complete",
            post(complete_lesson),
        )
}

/// Enroll in a free published course. Repeating the call is harmless.
#[utoipa::path(
    post,
    path = "/enrollments/{course_id}",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 201, description = "Enrolled", body = ProgressResponse),
        (status = 400, description = "Course is not free"),
        (status = 403, description = "Free enrollment is disabled"),
        (status = 404, description = "Unknown or unpublished course")
    )
)]
pub async fn enroll_free(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<Uuid>,
) -> AppResult<Created<ProgressResponse>> {
    let enrollment = state
        .services
        .enrollments()
        .enroll_free(user.id, course_id)
        .await?;
    Ok(Created(enrollment.into()))
}

#[utoipa::path(
    get,
    path = "/enrollments/mine",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Caller's enrollments", body = [EnrollmentResponse]))
)]
pub async fn my_enrollments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<EnrollmentResponse>>> {
    let enrollments = state
        .services
        .enrollments()
        .list_enrollments(user.id)
        .await?;
    Ok(Json(enrollments))
}

/// Progress in a course; 0% without an enrollment
#[utoipa::path(
    get,
    path = "/enrollments/{course_id}/progress",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses((status = 200, description = "Completed lessons and percent", body = ProgressResponse))
)]
pub async fn get_progress(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<ProgressResponse>> {
    let progress = state
        .services
        .enrollments()
        .get_progress(user.id, course_id)
        .await?;
    Ok(Json(progress))
}

#[utoipa::path(
    post,
    path = "/enrollments/{course_id}/lessons/{lesson_id}/complete",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(
        ("course_id" = Uuid, Path, description = "Course id"),
        ("lesson_id" = Uuid, Path, description = "Lesson id")
    ),
    responses(
        (status = 200, description = "Updated progress", body = ProgressResponse),
        (status = 400, description = "Lesson does not belong to the course"),
        (status = 403, description = "Not enrolled"),
        (status = 404, description = "Unknown course or lesson")
    )
)]
pub async fn complete_lesson(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ProgressResponse>> {
    let progress = state
        .services
        .enrollments()
        .mark_lesson_complete(user.id, course_id, lesson_id)
        .await?;
    Ok(Json(progress))
}
