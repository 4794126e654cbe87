//! Conversation and presence handlers.

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
use crate::api::middleware::{require_instructor, CurrentUser};
use crate::api::AppState;
use crate::domain::messaging::{ConversationResponse, MessageResponse};
use crate::errors::AppResult;
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectConversationRequest {
    pub participant_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    pub course_id: Uuid,
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    #[schema(example = "Is the week 3 lab due Friday?")]
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastResponse {
    pub conversation: ConversationResponse,
    pub message: MessageResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub marked_read: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUsers {
    pub user_ids: Vec<Uuid>,
}

/// Routes mounted under `/conversations`; all require authentication
pub fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_conversations))
        .route("/direct", post(start_direct))
        .route("/broadcast", post(broadcast))
        .route(
            "/:conversation_id/messages",
            get(list_messages).post(send_message),
        )
        .route("/:conversation_id/read", post(mark_read))
}

/// Routes mounted under `/presence`; all require authentication
pub fn presence_routes() -> Router<AppState> {
    Router::new().route("/online", get(online_users))
}

/// Find or create the direct conversation with another user
#[utoipa::path(
    post,
    path = "/conversations/direct",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    request_body = DirectConversationRequest,
    responses(
        (status = 200, description = "Direct conversation", body = ConversationResponse),
        (status = 400, description = "Cannot message yourself"),
        (status = 404, description = "Unknown participant")
    )
)]
pub async fn start_direct(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<DirectConversationRequest>,
) -> AppResult<Json<ConversationResponse>> {
    let conversation = state
        .services
        .messaging()
        .start_direct(user.id, payload.participant_id)
        .await?;
    Ok(Json(conversation.into()))
}

/// Message every student enrolled in one of the caller's courses
#[utoipa::path(
    post,
    path = "/conversations/broadcast",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    request_body = BroadcastRequest,
    responses(
        (status = 201, description = "Broadcast created", body = BroadcastResponse),
        (status = 403, description = "Not the course instructor")
    )
)]
pub async fn broadcast(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<BroadcastRequest>,
) -> AppResult<Created<BroadcastResponse>> {
    require_instructor(&user)?;
    let (conversation, message) = state
        .services
        .messaging()
        .broadcast(user.id, payload.course_id, payload.text)
        .await?;
    Ok(Created(BroadcastResponse {
        conversation: conversation.into(),
        message: message.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/conversations",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Conversations by last activity", body = [ConversationResponse]))
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ConversationResponse>>> {
    let conversations = state
        .services
        .messaging()
        .list_conversations(user.id)
        .await?;
    Ok(Json(conversations.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/conversations/{conversation_id}/messages",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    params(("conversation_id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages, oldest first", body = [MessageResponse]),
        (status = 403, description = "Not a participant")
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(conversation_id): Path<Uuid>,
) -> AppResult<Json<Vec<MessageResponse>>> {
    let messages = state
        .services
        .messaging()
        .list_messages(user.id, conversation_id)
        .await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/conversations/{conversation_id}/messages",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    params(("conversation_id" = Uuid, Path, description = "Conversation id")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored and relayed", body = MessageResponse),
        (status = 403, description = "Not a participant")
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(conversation_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SendMessageRequest>,
) -> AppResult<Created<MessageResponse>> {
    let message = state
        .services
        .messaging()
        .send_message(user.id, conversation_id, payload.text)
        .await?;
    Ok(Created(message.into()))
}

#[utoipa::path(
    post,
    path = "/conversations/{conversation_id}/read",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    params(("conversation_id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages newly marked read", body = ReadReceipt),
        (status = 403, description = "Not a participant")
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(conversation_id): Path<Uuid>,
) -> AppResult<Json<ReadReceipt>> {
    let marked_read = state
        .services
        .messaging()
        .mark_read(user.id, conversation_id)
        .await?;
    Ok(Json(ReadReceipt { marked_read }))
}

/// Users with an open websocket on this instance
#[utoipa::path(
    get,
    path = "/presence/online",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Online user ids", body = OnlineUsers))
)]
pub async fn online_users(State(state): State<AppState>, _user: CurrentUser) -> Json<OnlineUsers> {
    let user_ids = state.services.messaging().online_users().await;
    Json(OnlineUsers { user_ids })
}
