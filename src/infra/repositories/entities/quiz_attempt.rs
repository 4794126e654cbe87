//! Quiz attempt database entity.

use sea_orm::entity::prelude::*;

use crate::domain::quiz::QuizAttempt;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_attempts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub student_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub answers: Json,
    pub score: f64,
    pub correct_count: i32,
    pub total_questions: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for QuizAttempt {
    fn from(model: Model) -> Self {
        QuizAttempt {
            id: model.id,
            quiz_id: model.quiz_id,
            student_id: model.student_id,
            answers: serde_json::from_value(model.answers).unwrap_or_default(),
            score: model.score,
            correct_count: model.correct_count,
            total_questions: model.total_questions,
            created_at: model.created_at,
        }
    }
}
