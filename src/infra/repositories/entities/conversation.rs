//! Conversation database entity.
//!
//! Participants live in `conversation_participants`; repositories assemble
//! the domain [`Conversation`](crate::domain::Conversation) from both.

use sea_orm::entity::prelude::*;

use crate::domain::messaging::LastMessage;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "conversations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Option<Uuid>,
    #[sea_orm(unique)]
    pub direct_key: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub last_message_text: Option<String>,
    pub last_message_sender: Option<Uuid>,
    pub last_message_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn last_message(&self) -> Option<LastMessage> {
        match (
            &self.last_message_text,
            self.last_message_sender,
            self.last_message_at,
        ) {
            (Some(text), Some(sender_id), Some(sent_at)) => Some(LastMessage {
                text: text.clone(),
                sender_id,
                sent_at,
            }),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
