//! Conversations and messages.
//!
//! A conversation without a course is a direct message between exactly two
//! users and is unique per unordered pair. A conversation with a course is
//! a broadcast whose participants were snapshotted when it was created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Denormalized snapshot of the newest message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    pub text: String,
    pub sender_id: Uuid,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub course_id: Option<Uuid>,
    pub participants: Vec<Uuid>,
    pub last_message: Option<LastMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn is_direct(&self) -> bool {
        self.course_id.is_none()
    }

    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participants.contains(&user_id)
    }

    /// Participants other than `user_id`
    pub fn others(&self, user_id: Uuid) -> impl Iterator<Item = Uuid> + '_ {
        self.participants
            .iter()
            .copied()
            .filter(move |participant| *participant != user_id)
    }
}

/// Storage key of a direct conversation; identical for both orderings.
pub fn direct_key(a: Uuid, b: Uuid) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{}:{}", low, high)
}

/// Broadcast audience: the instructor plus every enrolled student, once.
pub fn broadcast_participants(instructor_id: Uuid, students: &[Uuid]) -> Vec<Uuid> {
    let mut participants = Vec::with_capacity(students.len() + 1);
    participants.push(instructor_id);
    for student in students {
        if !participants.contains(student) {
            participants.push(*student);
        }
    }
    participants
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub text: String,
    pub read_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Uuid,
    pub course_id: Option<Uuid>,
    pub is_broadcast: bool,
    pub participants: Vec<Uuid>,
    pub last_message: Option<LastMessage>,
    pub updated_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id,
            course_id: conversation.course_id,
            is_broadcast: conversation.course_id.is_some(),
            participants: conversation.participants,
            last_message: conversation.last_message,
            updated_at: conversation.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub text: String,
    pub read_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            text: message.text,
            read_by: message.read_by,
            created_at: message.created_at,
        }
    }
}
