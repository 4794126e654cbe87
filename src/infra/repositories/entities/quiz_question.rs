//! Quiz question database entity.

use sea_orm::entity::prelude::*;

use crate::domain::QuizQuestion;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_questions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub position: i32,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub options: Json,
    pub correct_answer: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for QuizQuestion {
    fn from(model: Model) -> Self {
        QuizQuestion {
            id: model.id,
            quiz_id: model.quiz_id,
            position: model.position,
            text: model.text,
            options: serde_json::from_value(model.options).unwrap_or_default(),
            correct_answer: model.correct_answer,
            created_at: model.created_at,
        }
    }
}
