//! Lesson handlers. Creation lives under `/courses/:id/lessons`.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::course::{LessonChanges, LessonResponse};
use crate::domain::quiz::QuizResponse;
use crate::domain::LessonResource;
use crate::errors::AppResult;
use crate::types::NoContent;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLessonRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub order_index: Option<i32>,
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    pub duration_minutes: Option<i32>,
    pub is_preview: Option<bool>,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub resources: Option<Vec<LessonResource>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
    pub lesson_id: Uuid,
    pub summary: String,
}

/// Routes mounted under `/lessons`; all require authentication
pub fn lesson_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:lesson_id",
            get(get_lesson).put(update_lesson).delete(delete_lesson),
        )
        .route("/:lesson_id/summary", post(summarize_lesson))
        .route("/:lesson_id/quiz", post(get_or_create_quiz))
}

#[utoipa::path(
    get,
    path = "/lessons/{lesson_id}",
    tag = "Lessons",
    security(("bearer_auth" = [])),
    params(("lesson_id" = Uuid, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Full lesson", body = LessonResponse),
        (status = 403, description = "Enrollment required for this lesson")
    )
)]
pub async fn get_lesson(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(lesson_id): Path<Uuid>,
) -> AppResult<Json<LessonResponse>> {
    let lesson = state
        .services
        .catalog()
        .get_lesson(user.id, lesson_id)
        .await?;
    Ok(Json(lesson))
}

#[utoipa::path(
    put,
    path = "/lessons/{lesson_id}",
    tag = "Lessons",
    security(("bearer_auth" = [])),
    params(("lesson_id" = Uuid, Path, description = "Lesson id")),
    request_body = UpdateLessonRequest,
    responses(
        (status = 200, description = "Lesson updated", body = LessonResponse),
        (status = 403, description = "Not the course instructor")
    )
)]
pub async fn update_lesson(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(lesson_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateLessonRequest>,
) -> AppResult<Json<LessonResponse>> {
    let changes = LessonChanges {
        title: payload.title,
        order_index: payload.order_index,
        duration_minutes: payload.duration_minutes,
        is_preview: payload.is_preview,
        content: payload.content,
        video_url: payload.video_url,
        resources: payload.resources,
    };
    let lesson = state
        .services
        .catalog()
        .update_lesson(user.id, lesson_id, changes)
        .await?;
    Ok(Json(LessonResponse::full(lesson)))
}

#[utoipa::path(
    delete,
    path = "/lessons/{lesson_id}",
    tag = "Lessons",
    security(("bearer_auth" = [])),
    params(("lesson_id" = Uuid, Path, description = "Lesson id")),
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 403, description = "Not the course instructor")
    )
)]
pub async fn delete_lesson(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(lesson_id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .catalog()
        .delete_lesson(user.id, lesson_id)
        .await?;
    Ok(NoContent)
}

#[utoipa::path(
    post,
    path = "/lessons/{lesson_id}/summary",
    tag = "Lessons",
    security(("bearer_auth" = [])),
    params(("lesson_id" = Uuid, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Generated summary", body = LessonSummary),
        (status = 502, description = "Summarizer unavailable")
    )
)]
pub async fn summarize_lesson(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(lesson_id): Path<Uuid>,
) -> AppResult<Json<LessonSummary>> {
    let summary = state
        .services
        .catalog()
        .summarize_lesson(user.id, lesson_id)
        .await?;
    Ok(Json(LessonSummary { lesson_id, summary }))
}

/// The lesson's quiz, created empty on first request
#[utoipa::path(
    post,
    path = "/lessons/{lesson_id}/quiz",
    tag = "Quizzes",
    security(("bearer_auth" = [])),
    params(("lesson_id" = Uuid, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Quiz with answer keys", body = QuizResponse),
        (status = 403, description = "Not the course instructor")
    )
)]
pub async fn get_or_create_quiz(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(lesson_id): Path<Uuid>,
) -> AppResult<Json<QuizResponse>> {
    let quiz = state
        .services
        .quizzes()
        .get_or_create(user.id, lesson_id)
        .await?;
    Ok(Json(quiz))
}
