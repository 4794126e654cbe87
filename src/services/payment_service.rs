//! Payment service - Gateway orders and post-payment enrollment.
//!
//! Order creation and signature checks are delegated to the gateway. A
//! verified payment marks the local order paid and creates the enrollment;
//! replaying the same verification returns the paid order again.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::DEFAULT_CURRENCY;
use crate::domain::payment::NewPaymentOrder;
use crate::domain::{OrderStatus, PaymentOrder};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::external::PaymentGateway;
use crate::infra::UnitOfWork;

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn create_order(&self, user_id: Uuid, course_id: Uuid) -> AppResult<PaymentOrder>;

    async fn verify_payment(
        &self,
        user_id: Uuid,
        order_id: String,
        payment_id: String,
        signature: String,
    ) -> AppResult<PaymentOrder>;
}

pub struct PaymentProcessor<U: UnitOfWork> {
    uow: Arc<U>,
    gateway: Arc<dyn PaymentGateway>,
}

impl<U: UnitOfWork> PaymentProcessor<U> {
    pub fn new(uow: Arc<U>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { uow, gateway }
    }
}

fn receipt_for(user_id: Uuid, course_id: Uuid) -> String {
    let user = user_id.simple().to_string();
    let course = course_id.simple().to_string();
    format!("rcpt_{}_{}", &user[..8], &course[..8])
}

#[async_trait]
impl<U: UnitOfWork> PaymentService for PaymentProcessor<U> {
    async fn create_order(&self, user_id: Uuid, course_id: Uuid) -> AppResult<PaymentOrder> {
        let course = self
            .uow
            .courses()
            .find_by_id(course_id)
            .await?
            .ok_or_not_found()?;
        if !course.is_published() {
            return Err(AppError::NotFound);
        }
        if course.is_free() {
            return Err(AppError::bad_request(
                "Free courses do not need a payment order",
            ));
        }
        if self.uow.enrollments().find(user_id, course_id).await?.is_some() {
            return Err(AppError::conflict("Enrollment"));
        }

        let gateway_order = self
            .gateway
            .create_order(
                course.price,
                DEFAULT_CURRENCY.to_string(),
                receipt_for(user_id, course_id),
            )
            .await?;

        let order = self
            .uow
            .payments()
            .create_order(NewPaymentOrder {
                order_id: gateway_order.order_id,
                user_id,
                course_id,
                amount: gateway_order.amount,
                currency: gateway_order.currency,
            })
            .await?;

        tracing::info!(order_id = %order.order_id, user_id = %user_id, course_id = %course_id, "Payment order created");
        Ok(order)
    }

    async fn verify_payment(
        &self,
        user_id: Uuid,
        order_id: String,
        payment_id: String,
        signature: String,
    ) -> AppResult<PaymentOrder> {
        let order = self
            .uow
            .payments()
            .find_by_order_id(&order_id)
            .await?
            .ok_or_not_found()?;
        if order.user_id != user_id {
            return Err(AppError::forbidden("This order belongs to another user"));
        }

        if order.status == OrderStatus::Paid {
            self.uow.enrollments().ensure(user_id, order.course_id).await?;
            return Ok(order);
        }

        let verified = self
            .gateway
            .verify_signature(order_id.clone(), payment_id.clone(), signature)
            .await?;
        if !verified {
            tracing::warn!(order_id = %order_id, user_id = %user_id, "Payment signature rejected");
            return Err(AppError::bad_request("Payment verification failed"));
        }

        let order = self.uow.payments().mark_paid(&order_id, payment_id).await?;
        self.uow.enrollments().ensure(user_id, order.course_id).await?;

        tracing::info!(order_id = %order_id, user_id = %user_id, course_id = %order.course_id, "Payment verified");
        Ok(order)
    }
}
