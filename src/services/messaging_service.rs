//! Messaging relay - Conversations, message history and live delivery.
//!
//! History is durable; live delivery goes through the in-process
//! [`PresenceRegistry`] and is best-effort. An offline or lagging
//! recipient catches up by fetching history.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::access::owned_course;
use crate::config::MAX_MESSAGE_LENGTH;
use crate::domain::messaging::{broadcast_participants, MessageResponse};
use crate::domain::{Conversation, Message};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::presence::Registration;
use crate::infra::{PresenceRegistry, RealtimeEvent, UnitOfWork};

#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Find or create the direct conversation between two users
    async fn start_direct(&self, user_id: Uuid, other_id: Uuid) -> AppResult<Conversation>;

    /// New conversation with the instructor and every enrolled student,
    /// opened with `text`
    async fn broadcast(
        &self,
        instructor_id: Uuid,
        course_id: Uuid,
        text: String,
    ) -> AppResult<(Conversation, Message)>;

    async fn list_conversations(&self, user_id: Uuid) -> AppResult<Vec<Conversation>>;

    async fn list_messages(&self, user_id: Uuid, conversation_id: Uuid)
        -> AppResult<Vec<Message>>;

    async fn send_message(
        &self,
        sender_id: Uuid,
        conversation_id: Uuid,
        text: String,
    ) -> AppResult<Message>;

    /// Returns how many messages were newly marked read
    async fn mark_read(&self, user_id: Uuid, conversation_id: Uuid) -> AppResult<u64>;

    async fn typing(&self, user_id: Uuid, conversation_id: Uuid) -> AppResult<()>;

    async fn online_users(&self) -> Vec<Uuid>;

    /// Register a websocket session and announce the user as online
    async fn connect(&self, user_id: Uuid) -> Registration;

    async fn disconnect(&self, user_id: Uuid, session_id: Uuid);
}

pub struct MessagingRelay<U: UnitOfWork> {
    uow: Arc<U>,
    presence: PresenceRegistry,
}

impl<U: UnitOfWork> MessagingRelay<U> {
    pub fn new(uow: Arc<U>, presence: PresenceRegistry) -> Self {
        Self { uow, presence }
    }

    /// Load a conversation the caller participates in.
    async fn participant_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> AppResult<Conversation> {
        let conversation = self
            .uow
            .conversations()
            .find_by_id(conversation_id)
            .await?
            .ok_or_not_found()?;
        if !conversation.has_participant(user_id) {
            return Err(AppError::forbidden(
                "You are not a participant of this conversation",
            ));
        }
        Ok(conversation)
    }

    async fn post(
        &self,
        conversation: &Conversation,
        sender_id: Uuid,
        text: String,
    ) -> AppResult<Message> {
        let message = self
            .uow
            .conversations()
            .add_message(conversation.id, sender_id, text)
            .await?;

        let recipients: Vec<Uuid> = conversation.others(sender_id).collect();
        let event = RealtimeEvent::NewMessage(MessageResponse::from(message.clone()));
        let delivered = self.presence.send_to_many(&recipients, &event).await;

        tracing::debug!(
            conversation_id = %conversation.id,
            sender_id = %sender_id,
            recipients = recipients.len(),
            delivered,
            "Message posted"
        );
        Ok(message)
    }
}

fn clean_text(text: String) -> AppResult<String> {
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::validation("Message text is required"));
    }
    if text.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::validation(format!(
            "Messages are limited to {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(text)
}

#[async_trait]
impl<U: UnitOfWork> MessagingService for MessagingRelay<U> {
    async fn start_direct(&self, user_id: Uuid, other_id: Uuid) -> AppResult<Conversation> {
        if user_id == other_id {
            return Err(AppError::bad_request(
                "Cannot start a conversation with yourself",
            ));
        }
        self.uow
            .users()
            .find_by_id(other_id)
            .await?
            .ok_or_not_found()?;

        self.uow
            .conversations()
            .find_or_create_direct(user_id, other_id)
            .await
    }

    async fn broadcast(
        &self,
        instructor_id: Uuid,
        course_id: Uuid,
        text: String,
    ) -> AppResult<(Conversation, Message)> {
        let text = clean_text(text)?;
        owned_course(self.uow.as_ref(), course_id, instructor_id).await?;

        let students = self.uow.enrollments().list_student_ids(course_id).await?;
        let participants = broadcast_participants(instructor_id, &students);
        let conversation = self
            .uow
            .conversations()
            .create_broadcast(course_id, participants)
            .await?;

        tracing::info!(
            course_id = %course_id,
            conversation_id = %conversation.id,
            recipients = students.len(),
            "Broadcast created"
        );

        let message = self.post(&conversation, instructor_id, text).await?;
        Ok((conversation, message))
    }

    async fn list_conversations(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        self.uow.conversations().list_for_user(user_id).await
    }

    async fn list_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> AppResult<Vec<Message>> {
        self.participant_conversation(user_id, conversation_id)
            .await?;
        self.uow.conversations().list_messages(conversation_id).await
    }

    async fn send_message(
        &self,
        sender_id: Uuid,
        conversation_id: Uuid,
        text: String,
    ) -> AppResult<Message> {
        let text = clean_text(text)?;
        let conversation = self
            .participant_conversation(sender_id, conversation_id)
            .await?;
        self.post(&conversation, sender_id, text).await
    }

    async fn mark_read(&self, user_id: Uuid, conversation_id: Uuid) -> AppResult<u64> {
        self.participant_conversation(user_id, conversation_id)
            .await?;
        self.uow
            .conversations()
            .mark_read(conversation_id, user_id)
            .await
    }

    async fn typing(&self, user_id: Uuid, conversation_id: Uuid) -> AppResult<()> {
        let conversation = self
            .participant_conversation(user_id, conversation_id)
            .await?;
        let recipients: Vec<Uuid> = conversation.others(user_id).collect();
        let event = RealtimeEvent::Typing {
            conversation_id,
            user_id,
        };
        self.presence.send_to_many(&recipients, &event).await;
        Ok(())
    }

    async fn online_users(&self) -> Vec<Uuid> {
        self.presence.online_users().await
    }

    async fn connect(&self, user_id: Uuid) -> Registration {
        let registration = self.presence.register(user_id).await;
        self.presence
            .broadcast(
                &RealtimeEvent::Presence {
                    user_id,
                    online: true,
                },
                user_id,
            )
            .await;
        tracing::info!(user_id = %user_id, session_id = %registration.session_id, "Websocket connected");
        registration
    }

    async fn disconnect(&self, user_id: Uuid, session_id: Uuid) {
        if self.presence.unregister(user_id, session_id).await {
            self.presence
                .broadcast(
                    &RealtimeEvent::Presence {
                        user_id,
                        online: false,
                    },
                    user_id,
                )
                .await;
        }
        tracing::info!(user_id = %user_id, session_id = %session_id, "Websocket disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_text_is_trimmed_and_bounded() {
        assert_eq!(clean_text("  hi ".to_string()).unwrap(), "hi");
        assert!(clean_text("   ".to_string()).is_err());
        assert!(clean_text("x".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
    }
}
