//! Lesson database entity.

use sea_orm::entity::prelude::*;

use crate::domain::Lesson;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub duration_minutes: i32,
    pub is_preview: bool,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub video_url: Option<String>,
    /// `[{title, url}]`
    #[sea_orm(column_type = "JsonBinary")]
    pub resources: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Lesson {
    fn from(model: Model) -> Self {
        Lesson {
            id: model.id,
            course_id: model.course_id,
            title: model.title,
            order_index: model.order_index,
            duration_minutes: model.duration_minutes,
            is_preview: model.is_preview,
            content: model.content,
            video_url: model.video_url,
            resources: serde_json::from_value(model.resources).unwrap_or_default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
