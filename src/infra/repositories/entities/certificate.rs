//! Certificate database entity.

use sea_orm::entity::prelude::*;

use crate::domain::Certificate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "certificates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub certificate_id: String,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub issued_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Certificate {
    fn from(model: Model) -> Self {
        Certificate {
            id: model.id,
            certificate_id: model.certificate_id,
            user_id: model.user_id,
            course_id: model.course_id,
            issued_at: model.issued_at,
        }
    }
}
