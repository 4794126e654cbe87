//! Catalog handlers: courses, their lessons and reviews.
//!
//! Mounted without the auth middleware. Read endpoints take an optional
//! viewer; write endpoints take `CurrentUser` and fail with 401 without one.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_instructor, CurrentUser};
use crate::api::AppState;
use crate::domain::course::{CourseChanges, CourseResponse, LessonResponse, NewCourse, NewLesson};
use crate::domain::review::ReviewResponse;
use crate::domain::LessonResource;
use crate::errors::AppResult;
use crate::types::{CoursePage, Created, NoContent, Paginated, PaginationParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[schema(example = "Rust for Backend Engineers")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Smallest currency unit; 0 makes the course free
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    #[schema(example = 49900)]
    pub price: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[schema(example = "Ownership and borrowing")]
    pub title: String,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    pub duration_minutes: i32,
    #[serde(default)]
    pub is_preview: bool,
    #[serde(default)]
    pub content: String,
    pub video_url: Option<String>,
    #[serde(default)]
    pub resources: Vec<LessonResource>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(example = 5)]
    pub rating: i32,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Comment is too long"))]
    pub comment: String,
}

/// Routes mounted under `/courses`
pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/mine", get(my_courses))
        .route(
            "/:course_id",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/:course_id/publish", post(publish_course))
        .route("/:course_id/unpublish", post(unpublish_course))
        .route("/:course_id/lessons", get(list_lessons).post(create_lesson))
        .route("/:course_id/reviews", get(list_reviews).post(add_review))
}

/// Published courses, newest first
#[utoipa::path(
    get,
    path = "/courses",
    tag = "Courses",
    params(PaginationParams),
    responses((status = 200, description = "Page of published courses", body = CoursePage))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<CoursePage>> {
    let (courses, total) = state.services.catalog().list_published(params).await?;
    let data = courses.into_iter().map(CourseResponse::from).collect();
    Ok(Json(Paginated::new(data, params, total)))
}

#[utoipa::path(
    post,
    path = "/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Draft course created", body = CourseResponse),
        (status = 403, description = "Instructor role required")
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateCourseRequest>,
) -> AppResult<Created<CourseResponse>> {
    require_instructor(&user)?;

    let course = state
        .services
        .catalog()
        .create_course(NewCourse {
            instructor_id: user.id,
            title: payload.title,
            description: payload.description,
            price: payload.price,
        })
        .await?;

    Ok(Created(course.into()))
}

/// Every course the caller teaches, in any status
#[utoipa::path(
    get,
    path = "/courses/mine",
    tag = "Courses",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Instructor's courses", body = [CourseResponse]))
)]
pub async fn my_courses(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<CourseResponse>>> {
    require_instructor(&user)?;
    let courses = state
        .services
        .catalog()
        .list_instructor_courses(user.id)
        .await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/courses/{course_id}",
    tag = "Courses",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course detail", body = CourseResponse),
        (status = 404, description = "Unknown or unpublished course")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    viewer: Option<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<CourseResponse>> {
    let course = state
        .services
        .catalog()
        .get_course(viewer.map(|v| v.id), course_id)
        .await?;
    Ok(Json(course.into()))
}

#[utoipa::path(
    put,
    path = "/courses/{course_id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 403, description = "Not the course instructor")
    )
)]
pub async fn update_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCourseRequest>,
) -> AppResult<Json<CourseResponse>> {
    let changes = CourseChanges {
        title: payload.title,
        description: payload.description,
        price: payload.price,
    };
    let course = state
        .services
        .catalog()
        .update_course(user.id, course_id, changes)
        .await?;
    Ok(Json(course.into()))
}

#[utoipa::path(
    delete,
    path = "/courses/{course_id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 403, description = "Not the course instructor")
    )
)]
pub async fn delete_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .catalog()
        .delete_course(user.id, course_id)
        .await?;
    Ok(NoContent)
}

#[utoipa::path(
    post,
    path = "/courses/{course_id}/publish",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses((status = 200, description = "Course published", body = CourseResponse))
)]
pub async fn publish_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<CourseResponse>> {
    let course = state
        .services
        .catalog()
        .set_published(user.id, course_id, true)
        .await?;
    Ok(Json(course.into()))
}

#[utoipa::path(
    post,
    path = "/courses/{course_id}/unpublish",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses((status = 200, description = "Course unpublished", body = CourseResponse))
)]
pub async fn unpublish_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<CourseResponse>> {
    let course = state
        .services
        .catalog()
        .set_published(user.id, course_id, false)
        .await?;
    Ok(Json(course.into()))
}

/// Curriculum; bodies of non-preview lessons are withheld from outsiders
#[utoipa::path(
    get,
    path = "/courses/{course_id}/lessons",
    tag = "Lessons",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses((status = 200, description = "Lessons in curriculum order", body = [LessonResponse]))
)]
pub async fn list_lessons(
    State(state): State<AppState>,
    viewer: Option<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<Vec<LessonResponse>>> {
    let lessons = state
        .services
        .catalog()
        .list_lessons(viewer.map(|v| v.id), course_id)
        .await?;
    Ok(Json(lessons))
}

#[utoipa::path(
    post,
    path = "/courses/{course_id}/lessons",
    tag = "Lessons",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course id")),
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Lesson created", body = LessonResponse),
        (status = 403, description = "Not the course instructor")
    )
)]
pub async fn create_lesson(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateLessonRequest>,
) -> AppResult<Created<LessonResponse>> {
    let lesson = state
        .services
        .catalog()
        .create_lesson(
            user.id,
            NewLesson {
                course_id,
                title: payload.title,
                order_index: payload.order_index,
                duration_minutes: payload.duration_minutes,
                is_preview: payload.is_preview,
                content: payload.content,
                video_url: payload.video_url,
                resources: payload.resources,
            },
        )
        .await?;
    Ok(Created(LessonResponse::full(lesson)))
}

#[utoipa::path(
    get,
    path = "/courses/{course_id}/reviews",
    tag = "Reviews",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses((status = 200, description = "Course reviews", body = [ReviewResponse]))
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<Vec<ReviewResponse>>> {
    let reviews = state.services.reviews().list_reviews(course_id).await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/courses/{course_id}/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course id")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = ReviewResponse),
        (status = 403, description = "Not enrolled"),
        (status = 409, description = "Already reviewed")
    )
)]
pub async fn add_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReviewRequest>,
) -> AppResult<Created<ReviewResponse>> {
    let review = state
        .services
        .reviews()
        .add_review(user.id, course_id, payload.rating, payload.comment)
        .await?;
    Ok(Created(review.into()))
}
