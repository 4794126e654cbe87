//! Course assessment handlers: authoring, taking, submitting and the
//! student dashboard.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_instructor, CurrentUser};
use crate::api::AppState;
use crate::domain::assessment::{
    AssessmentDashboardRow, AssessmentResponse, AttemptResponse, MediaKind, QuestionResponse,
    SubmissionResult, TakeAssessmentResponse,
};
use crate::domain::{QuestionDraft, QuestionType, SubmittedAnswer};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssessmentRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "Passing score must be between 0 and 100"))]
    #[schema(example = 75.0)]
    pub passing_score: Option<f64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddQuestionRequest {
    #[validate(length(min = 1, message = "Question text is required"))]
    #[schema(example = "Which trait enables `?` on a custom error?")]
    pub text: String,
    pub media_url: Option<String>,
    pub media_kind: Option<MediaKind>,
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[schema(example = "From")]
    pub correct_answer: String,
}

impl From<AddQuestionRequest> for QuestionDraft {
    fn from(request: AddQuestionRequest) -> Self {
        Self {
            text: request.text,
            media_url: request.media_url,
            media_kind: request.media_kind,
            question_type: request.question_type,
            options: request.options,
            correct_answer: request.correct_answer,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssessmentRequest {
    pub answers: Vec<SubmittedAnswer>,
}

/// Routes mounted under `/assessments`; all require authentication
pub fn assessment_routes() -> Router<AppState> {
    Router::new()
        .route("/my-assessments", get(my_assessments))
        .route("/course/:course_id", post(get_or_create_assessment))
        .route("/questions/:question_id", delete(delete_question))
        .route("/:assessment_id", put(update_assessment))
        .route("/:assessment_id/questions", post(add_question))
        .route("/:assessment_id/take", get(take_assessment))
        .route("/:assessment_id/submit", post(submit_assessment))
        .route("/:assessment_id/attempts", get(list_attempts))
}

/// The course's assessment, created empty on first request
#[utoipa::path(
    post,
    path = "/assessments/course/{course_id}",
    tag = "Assessments",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Assessment with answer keys", body = AssessmentResponse),
        (status = 403, description = "Not the course instructor"),
        (status = 404, description = "Unknown course")
    )
)]
pub async fn get_or_create_assessment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<AssessmentResponse>> {
    require_instructor(&user)?;
    let assessment = state
        .services
        .assessments()
        .get_or_create(user.id, course_id)
        .await?;
    Ok(Json(assessment))
}

#[utoipa::path(
    put,
    path = "/assessments/{assessment_id}",
    tag = "Assessments",
    security(("bearer_auth" = [])),
    params(("assessment_id" = Uuid, Path, description = "Assessment id")),
    request_body = UpdateAssessmentRequest,
    responses(
        (status = 200, description = "Assessment updated", body = AssessmentResponse),
        (status = 403, description = "Not the course instructor")
    )
)]
pub async fn update_assessment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(assessment_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateAssessmentRequest>,
) -> AppResult<Json<AssessmentResponse>> {
    let assessment = state
        .services
        .assessments()
        .update(user.id, assessment_id, payload.title, payload.passing_score)
        .await?;
    Ok(Json(assessment))
}

#[utoipa::path(
    post,
    path = "/assessments/{assessment_id}/questions",
    tag = "Assessments",
    security(("bearer_auth" = [])),
    params(("assessment_id" = Uuid, Path, description = "Assessment id")),
    request_body = AddQuestionRequest,
    responses(
        (status = 201, description = "Question added", body = QuestionResponse),
        (status = 400, description = "Question violates the rules of its type"),
        (status = 403, description = "Not the course instructor")
    )
)]
pub async fn add_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(assessment_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddQuestionRequest>,
) -> AppResult<Created<QuestionResponse>> {
    let question = state
        .services
        .assessments()
        .add_question(user.id, assessment_id, payload.into())
        .await?;
    Ok(Created(question.into()))
}

#[utoipa::path(
    delete,
    path = "/assessments/questions/{question_id}",
    tag = "Assessments",
    security(("bearer_auth" = [])),
    params(("question_id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 204, description = "Question removed"),
        (status = 403, description = "Not the course instructor")
    )
)]
pub async fn delete_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(question_id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .assessments()
        .delete_question(user.id, question_id)
        .await?;
    Ok(NoContent)
}

/// Questions without answer keys
#[utoipa::path(
    get,
    path = "/assessments/{assessment_id}/take",
    tag = "Assessments",
    security(("bearer_auth" = [])),
    params(("assessment_id" = Uuid, Path, description = "Assessment id")),
    responses(
        (status = 200, description = "Questions to answer", body = TakeAssessmentResponse),
        (status = 403, description = "Not enrolled or course not finished")
    )
)]
pub async fn take_assessment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(assessment_id): Path<Uuid>,
) -> AppResult<Json<TakeAssessmentResponse>> {
    let assessment = state
        .services
        .assessments()
        .take(user.id, assessment_id)
        .await?;
    Ok(Json(assessment))
}

/// Grade a submission; a passing one also issues the certificate
#[utoipa::path(
    post,
    path = "/assessments/{assessment_id}/submit",
    tag = "Assessments",
    security(("bearer_auth" = [])),
    params(("assessment_id" = Uuid, Path, description = "Assessment id")),
    request_body = SubmitAssessmentRequest,
    responses(
        (status = 200, description = "Grading result", body = SubmissionResult),
        (status = 403, description = "Not enrolled or course not finished")
    )
)]
pub async fn submit_assessment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(assessment_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SubmitAssessmentRequest>,
) -> AppResult<Json<SubmissionResult>> {
    let result = state
        .services
        .assessments()
        .submit(user.id, assessment_id, payload.answers)
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/assessments/my-assessments",
    tag = "Assessments",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Derived status per enrolled course", body = [AssessmentDashboardRow]))
)]
pub async fn my_assessments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<AssessmentDashboardRow>>> {
    let rows = state.services.assessments().dashboard(user.id).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/assessments/{assessment_id}/attempts",
    tag = "Assessments",
    security(("bearer_auth" = [])),
    params(("assessment_id" = Uuid, Path, description = "Assessment id")),
    responses((status = 200, description = "Caller's attempts", body = [AttemptResponse]))
)]
pub async fn list_attempts(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(assessment_id): Path<Uuid>,
) -> AppResult<Json<Vec<AttemptResponse>>> {
    let attempts = state
        .services
        .assessments()
        .list_attempts(user.id, assessment_id)
        .await?;
    Ok(Json(attempts.into_iter().map(Into::into).collect()))
}
