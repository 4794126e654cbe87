//! Process-local presence registry.
//!
//! Maps each online user to their live websocket session and an outbound
//! channel. State is rebuilt from nothing on restart and is not shared
//! between instances, so a multi-instance deployment sees per-instance
//! presence. Delivery is best-effort: a full or closed channel drops the
//! event and the client catches up from message history.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::config::PRESENCE_CHANNEL_CAPACITY;
use crate::domain::messaging::MessageResponse;

/// Server-to-client websocket event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RealtimeEvent {
    #[serde(rename_all = "camelCase")]
    Typing { conversation_id: Uuid, user_id: Uuid },
    NewMessage(MessageResponse),
    #[serde(rename_all = "camelCase")]
    Presence { user_id: Uuid, online: bool },
}

struct Session {
    session_id: Uuid,
    sender: mpsc::Sender<RealtimeEvent>,
}

/// Handle returned to a freshly connected socket
pub struct Registration {
    pub session_id: Uuid,
    pub events: mpsc::Receiver<RealtimeEvent>,
}

#[derive(Clone, Default)]
pub struct PresenceRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session for `user_id`, replacing any older one.
    pub async fn register(&self, user_id: Uuid) -> Registration {
        let (sender, events) = mpsc::channel(PRESENCE_CHANNEL_CAPACITY);
        let session_id = Uuid::new_v4();

        self.sessions
            .write()
            .await
            .insert(user_id, Session { session_id, sender });

        tracing::debug!(user_id = %user_id, session_id = %session_id, "Presence registered");
        Registration { session_id, events }
    }

    /// Remove the user's entry if it still belongs to `session_id`.
    ///
    /// A reconnect registers a new session before the old socket finishes
    /// closing; the stale disconnect must not evict the new one.
    pub async fn unregister(&self, user_id: Uuid, session_id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&user_id) {
            Some(session) if session.session_id == session_id => {
                sessions.remove(&user_id);
                tracing::debug!(user_id = %user_id, session_id = %session_id, "Presence removed");
                true
            }
            _ => false,
        }
    }

    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.sessions.read().await.contains_key(&user_id)
    }

    pub async fn online_users(&self) -> Vec<Uuid> {
        self.sessions.read().await.keys().copied().collect()
    }

    /// Best-effort delivery to one user. Returns whether it was queued.
    pub async fn send_to(&self, user_id: Uuid, event: RealtimeEvent) -> bool {
        let sessions = self.sessions.read().await;
        match sessions.get(&user_id) {
            Some(session) => session.sender.try_send(event).is_ok(),
            None => false,
        }
    }

    /// Deliver to each listed user that is online; returns how many were reached.
    pub async fn send_to_many(&self, user_ids: &[Uuid], event: &RealtimeEvent) -> usize {
        let sessions = self.sessions.read().await;
        user_ids
            .iter()
            .filter_map(|user_id| sessions.get(user_id))
            .filter(|session| session.sender.try_send(event.clone()).is_ok())
            .count()
    }

    /// Deliver to every online user except `except`.
    pub async fn broadcast(&self, event: &RealtimeEvent, except: Uuid) {
        let sessions = self.sessions.read().await;
        for (user_id, session) in sessions.iter() {
            if *user_id != except {
                let _ = session.sender.try_send(event.clone());
            }
        }
    }
}
