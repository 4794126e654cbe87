//! Conversation and message repository.
//!
//! A direct conversation is keyed by [`direct_key`], backed by a unique
//! index, so two users racing to open the same thread get one row.
//! Multi-row writes run in a single transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use super::entities::conversation::{self, Entity as ConversationEntity};
use super::entities::conversation_participant::{self, Entity as ParticipantEntity};
use super::entities::message::{self, Entity as MessageEntity};
use crate::domain::messaging::direct_key;
use crate::domain::{Conversation, Message};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>>;

    /// The direct conversation between two users, created on first use
    async fn find_or_create_direct(&self, a: Uuid, b: Uuid) -> AppResult<Conversation>;

    /// A new course broadcast with a fixed participant snapshot
    async fn create_broadcast(
        &self,
        course_id: Uuid,
        participants: Vec<Uuid>,
    ) -> AppResult<Conversation>;

    /// Conversations the user takes part in, most recent activity first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>>;

    /// Append a message and refresh the conversation's last-message snapshot
    async fn add_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        text: String,
    ) -> AppResult<Message>;

    /// Messages oldest first
    async fn list_messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>>;

    /// Add `user_id` to the read-by set of every message; returns how many changed
    async fn mark_read(&self, conversation_id: Uuid, user_id: Uuid) -> AppResult<u64>;
}

pub struct ConversationStore {
    db: DatabaseConnection,
}

impl ConversationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn assemble(&self, models: Vec<conversation::Model>) -> AppResult<Vec<Conversation>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|model| model.id).collect();
        let mut participants: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in ParticipantEntity::find()
            .filter(conversation_participant::Column::ConversationId.is_in(ids))
            .all(&self.db)
            .await?
        {
            participants
                .entry(row.conversation_id)
                .or_default()
                .push(row.user_id);
        }

        Ok(models
            .into_iter()
            .map(|model| Conversation {
                id: model.id,
                course_id: model.course_id,
                participants: participants.remove(&model.id).unwrap_or_default(),
                last_message: model.last_message(),
                created_at: model.created_at,
                updated_at: model.updated_at,
            })
            .collect())
    }

    async fn assemble_one(&self, model: conversation::Model) -> AppResult<Conversation> {
        self.assemble(vec![model])
            .await?
            .pop()
            .ok_or_else(|| AppError::internal("conversation vanished while loading"))
    }
}

fn participant_rows(
    conversation_id: Uuid,
    users: &[Uuid],
) -> Vec<conversation_participant::ActiveModel> {
    users
        .iter()
        .map(|user_id| conversation_participant::ActiveModel {
            conversation_id: Set(conversation_id),
            user_id: Set(*user_id),
        })
        .collect()
}

fn new_conversation(
    id: Uuid,
    course_id: Option<Uuid>,
    direct_key: Option<String>,
) -> conversation::ActiveModel {
    let now = chrono::Utc::now();
    conversation::ActiveModel {
        id: Set(id),
        course_id: Set(course_id),
        direct_key: Set(direct_key),
        last_message_text: Set(None),
        last_message_sender: Set(None),
        last_message_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[async_trait]
impl ConversationRepository for ConversationStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        match ConversationEntity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(self.assemble_one(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_or_create_direct(&self, a: Uuid, b: Uuid) -> AppResult<Conversation> {
        let key = direct_key(a, b);
        let conversation_id = Uuid::new_v4();
        let active_model = new_conversation(conversation_id, None, Some(key.clone()));

        let txn = self.db.begin().await?;
        let inserted = ConversationEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(conversation::Column::DirectKey)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        if inserted > 0 {
            ParticipantEntity::insert_many(participant_rows(conversation_id, &[a, b]))
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        let model = ConversationEntity::find()
            .filter(conversation::Column::DirectKey.eq(key))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::internal("direct conversation missing after upsert"))?;

        self.assemble_one(model).await
    }

    async fn create_broadcast(
        &self,
        course_id: Uuid,
        participants: Vec<Uuid>,
    ) -> AppResult<Conversation> {
        let txn = self.db.begin().await?;
        let model = new_conversation(Uuid::new_v4(), Some(course_id), None).insert(&txn).await?;
        if !participants.is_empty() {
            ParticipantEntity::insert_many(participant_rows(model.id, &participants))
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        Ok(Conversation {
            id: model.id,
            course_id: model.course_id,
            participants,
            last_message: None,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let ids: Vec<Uuid> = ParticipantEntity::find()
            .filter(conversation_participant::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| row.conversation_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = ConversationEntity::find()
            .filter(conversation::Column::Id.is_in(ids))
            .order_by_desc(conversation::Column::UpdatedAt)
            .all(&self.db)
            .await?;

        self.assemble(models).await
    }

    async fn add_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        text: String,
    ) -> AppResult<Message> {
        let now = chrono::Utc::now();
        let txn = self.db.begin().await?;

        let conversation = ConversationEntity::find_by_id(conversation_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let message = message::ActiveModel {
            id: Set(Uuid::new_v4()),
            conversation_id: Set(conversation_id),
            sender_id: Set(sender_id),
            text: Set(text.clone()),
            read_by: Set(serde_json::json!([sender_id])),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut active: conversation::ActiveModel = conversation.into();
        active.last_message_text = Set(Some(text));
        active.last_message_sender = Set(Some(sender_id));
        active.last_message_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(Message::from(message))
    }

    async fn list_messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        let models = MessageEntity::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(message::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Message::from).collect())
    }

    async fn mark_read(&self, conversation_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let reader = user_id.to_string();
        let result = self
            .db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                r#"UPDATE messages
                   SET read_by = read_by || jsonb_build_array($1::text)
                   WHERE conversation_id = $2
                     AND NOT read_by @> jsonb_build_array($1::text)"#,
                [reader.into(), conversation_id.into()],
            ))
            .await?;

        Ok(result.rows_affected())
    }
}
