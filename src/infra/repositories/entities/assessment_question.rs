//! Assessment question database entity.

use sea_orm::entity::prelude::*;

use crate::domain::assessment::MediaKind;
use crate::domain::{AssessmentQuestion, QuestionType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assessment_questions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub position: i32,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub media_url: Option<String>,
    pub media_kind: Option<String>,
    pub question_type: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub options: Json,
    pub correct_answer: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AssessmentQuestion {
    fn from(model: Model) -> Self {
        AssessmentQuestion {
            id: model.id,
            assessment_id: model.assessment_id,
            position: model.position,
            text: model.text,
            media_url: model.media_url,
            media_kind: model.media_kind.as_deref().and_then(MediaKind::parse),
            question_type: QuestionType::try_from(model.question_type.as_str())
                .unwrap_or(QuestionType::FillInTheBlank),
            options: serde_json::from_value(model.options).unwrap_or_default(),
            correct_answer: model.correct_answer,
            created_at: model.created_at,
        }
    }
}
