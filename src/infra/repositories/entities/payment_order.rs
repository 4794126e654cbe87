//! Payment order database entity.

use sea_orm::entity::prelude::*;

use crate::domain::{OrderStatus, PaymentOrder};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_id: String,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub payment_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PaymentOrder {
    fn from(model: Model) -> Self {
        PaymentOrder {
            id: model.id,
            order_id: model.order_id,
            user_id: model.user_id,
            course_id: model.course_id,
            amount: model.amount,
            currency: model.currency,
            status: OrderStatus::from(model.status.as_str()),
            payment_id: model.payment_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
