//! Payment order repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::payment_order::{self, Entity as PaymentOrderEntity};
use crate::domain::payment::NewPaymentOrder;
use crate::domain::{OrderStatus, PaymentOrder};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create_order(&self, order: NewPaymentOrder) -> AppResult<PaymentOrder>;

    async fn find_by_order_id(&self, order_id: &str) -> AppResult<Option<PaymentOrder>>;

    /// Record the gateway payment and flip the order to `paid`
    async fn mark_paid(&self, order_id: &str, payment_id: String) -> AppResult<PaymentOrder>;
}

pub struct PaymentStore {
    db: DatabaseConnection,
}

impl PaymentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, order_id: &str) -> AppResult<Option<payment_order::Model>> {
        PaymentOrderEntity::find()
            .filter(payment_order::Column::OrderId.eq(order_id))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl PaymentRepository for PaymentStore {
    async fn create_order(&self, order: NewPaymentOrder) -> AppResult<PaymentOrder> {
        let now = chrono::Utc::now();
        let active_model = payment_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.order_id),
            user_id: Set(order.user_id),
            course_id: Set(order.course_id),
            amount: Set(order.amount),
            currency: Set(order.currency),
            status: Set(OrderStatus::Created.as_str().to_string()),
            payment_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(PaymentOrder::from(model))
    }

    async fn find_by_order_id(&self, order_id: &str) -> AppResult<Option<PaymentOrder>> {
        Ok(self.find_model(order_id).await?.map(PaymentOrder::from))
    }

    async fn mark_paid(&self, order_id: &str, payment_id: String) -> AppResult<PaymentOrder> {
        let model = self.find_model(order_id).await?.ok_or(AppError::NotFound)?;
        let mut active: payment_order::ActiveModel = model.into();
        active.status = Set(OrderStatus::Paid.as_str().to_string());
        active.payment_id = Set(Some(payment_id));
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(PaymentOrder::from(model))
    }
}
