//! Course database entity.

use sea_orm::entity::prelude::*;

use crate::domain::{Course, CourseStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub instructor_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: i64,
    pub status: String,
    pub average_rating: f64,
    pub num_reviews: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Course {
    fn from(model: Model) -> Self {
        Course {
            id: model.id,
            instructor_id: model.instructor_id,
            title: model.title,
            description: model.description,
            price: model.price,
            status: CourseStatus::try_from(model.status.as_str()).unwrap_or(CourseStatus::Draft),
            average_rating: model.average_rating,
            num_reviews: model.num_reviews,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
