//! Assessment attempt database entity.

use sea_orm::entity::prelude::*;

use crate::domain::AssessmentAttempt;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assessment_attempts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub student_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub answers: Json,
    pub score: f64,
    pub passed: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AssessmentAttempt {
    fn from(model: Model) -> Self {
        AssessmentAttempt {
            id: model.id,
            assessment_id: model.assessment_id,
            student_id: model.student_id,
            answers: serde_json::from_value(model.answers).unwrap_or_default(),
            score: model.score,
            passed: model.passed,
            created_at: model.created_at,
        }
    }
}
