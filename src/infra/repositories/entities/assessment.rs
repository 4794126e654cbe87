//! Assessment database entity.

use sea_orm::entity::prelude::*;

use crate::domain::Assessment;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub course_id: Uuid,
    pub title: String,
    pub passing_score: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Assessment {
    fn from(model: Model) -> Self {
        Assessment {
            id: model.id,
            course_id: model.course_id,
            title: model.title,
            passing_score: model.passing_score,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
