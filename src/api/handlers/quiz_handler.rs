//! Lesson quiz handlers. Quizzes are created under `/lessons/:id/quiz`.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::quiz::{QuizQuestionDraft, QuizQuestionResponse, QuizResult, TakeQuizResponse};
use crate::domain::QuizAnswer;
use crate::errors::AppResult;
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddQuizQuestionRequest {
    #[validate(length(min = 1, message = "Question text is required"))]
    #[schema(example = "Which pointer is safe to share across threads?")]
    pub text: String,
    #[validate(length(min = 2, message = "At least 2 options are required"))]
    pub options: Vec<String>,
    #[schema(example = "Arc")]
    pub correct_answer: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    pub answers: Vec<QuizAnswer>,
}

/// Routes mounted under `/quizzes`; all require authentication
pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/:quiz_id/questions", post(add_question))
        .route("/:quiz_id/take", get(take_quiz))
        .route("/:quiz_id/submit", post(submit_quiz))
}

#[utoipa::path(
    post,
    path = "/quizzes/{quiz_id}/questions",
    tag = "Quizzes",
    security(("bearer_auth" = [])),
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    request_body = AddQuizQuestionRequest,
    responses(
        (status = 201, description = "Question added", body = QuizQuestionResponse),
        (status = 400, description = "Correct answer is not one of the options"),
        (status = 403, description = "Not the course instructor")
    )
)]
pub async fn add_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddQuizQuestionRequest>,
) -> AppResult<Created<QuizQuestionResponse>> {
    let draft = QuizQuestionDraft {
        text: payload.text,
        options: payload.options,
        correct_answer: payload.correct_answer,
    };
    let question = state
        .services
        .quizzes()
        .add_question(user.id, quiz_id, draft)
        .await?;
    Ok(Created(question.into()))
}

#[utoipa::path(
    get,
    path = "/quizzes/{quiz_id}/take",
    tag = "Quizzes",
    security(("bearer_auth" = [])),
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Questions without answer keys", body = TakeQuizResponse),
        (status = 403, description = "Not enrolled")
    )
)]
pub async fn take_quiz(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
) -> AppResult<Json<TakeQuizResponse>> {
    let quiz = state.services.quizzes().take(user.id, quiz_id).await?;
    Ok(Json(quiz))
}

#[utoipa::path(
    post,
    path = "/quizzes/{quiz_id}/submit",
    tag = "Quizzes",
    security(("bearer_auth" = [])),
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    request_body = SubmitQuizRequest,
    responses(
        (status = 200, description = "Score with per-question feedback", body = QuizResult),
        (status = 403, description = "Not enrolled")
    )
)]
pub async fn submit_quiz(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SubmitQuizRequest>,
) -> AppResult<Json<QuizResult>> {
    let result = state
        .services
        .quizzes()
        .submit(user.id, quiz_id, payload.answers)
        .await?;
    Ok(Json(result))
}
