//! Quiz database entity.

use sea_orm::entity::prelude::*;

use crate::domain::Quiz;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "quizzes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub lesson_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Quiz {
    fn from(model: Model) -> Self {
        Quiz {
            id: model.id,
            lesson_id: model.lesson_id,
            course_id: model.course_id,
            title: model.title,
            created_at: model.created_at,
        }
    }
}
