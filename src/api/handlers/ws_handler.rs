//! Realtime websocket: presence, typing indicators and new-message pushes.
//!
//! Browsers cannot set headers on a websocket handshake, so the token may
//! also be passed as `?token=`.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::{authenticate, session_token};
use crate::api::AppState;
use crate::errors::{AppError, AppResult};
use crate::services::MessagingService;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// Client-to-server websocket event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    Typing { conversation_id: Uuid },
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let token = params
        .token
        .or_else(|| session_token(&headers))
        .ok_or(AppError::Unauthorized)?;
    let user = authenticate(&state, &token)?;
    let messaging = state.services.messaging();

    Ok(ws.on_upgrade(move |socket| run_session(socket, messaging, user.id)))
}

async fn run_session(socket: WebSocket, messaging: Arc<dyn MessagingService>, user_id: Uuid) {
    let registration = messaging.connect(user_id).await;
    let session_id = registration.session_id;
    let mut events = registration.events;
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            outbound = events.recv() => {
                // Closed when a newer session replaced this one
                let Some(event) = outbound else { break };
                let payload = match serde_json::to_string(&event) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to encode realtime event");
                        continue;
                    }
                };
                if sender.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    handle_client_event(messaging.as_ref(), user_id, &text).await;
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }

    messaging.disconnect(user_id, session_id).await;
}

async fn handle_client_event(messaging: &dyn MessagingService, user_id: Uuid, text: &str) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(ClientEvent::Typing { conversation_id }) => {
            if let Err(e) = messaging.typing(user_id, conversation_id).await {
                tracing::debug!(user_id = %user_id, conversation_id = %conversation_id, error = %e, "Typing event rejected");
            }
        }
        Err(e) => {
            tracing::debug!(user_id = %user_id, error = %e, "Ignoring malformed client event");
        }
    }
}
