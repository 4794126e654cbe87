//! Paid enrollment through the payment gateway.

use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::payment::OrderResponse;
use crate::errors::AppResult;
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub course_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1, message = "Order id is required"))]
    pub order_id: String,
    #[validate(length(min = 1, message = "Payment id is required"))]
    pub payment_id: String,
    #[validate(length(min = 1, message = "Signature is required"))]
    pub signature: String,
}

/// Routes mounted under `/payments`; all require authentication
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/verify", post(verify_payment))
}

#[utoipa::path(
    post,
    path = "/payments/orders",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Gateway order created", body = OrderResponse),
        (status = 400, description = "Course is free"),
        (status = 409, description = "Already enrolled"),
        (status = 502, description = "Gateway unavailable")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<Created<OrderResponse>> {
    let order = state
        .services
        .payments()
        .create_order(user.id, payload.course_id)
        .await?;
    Ok(Created(order.into()))
}

/// Confirm a payment and enroll the buyer. Repeating the call is harmless.
#[utoipa::path(
    post,
    path = "/payments/verify",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Order paid and enrollment created", body = OrderResponse),
        (status = 400, description = "Signature did not verify"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Unknown order")
    )
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<VerifyPaymentRequest>,
) -> AppResult<Json<OrderResponse>> {
    let order = state
        .services
        .payments()
        .verify_payment(
            user.id,
            payload.order_id,
            payload.payment_id,
            payload.signature,
        )
        .await?;
    Ok(Json(order.into()))
}
