//! Interfaces to third-party services.
//!
//! Payment, media hosting, PDF rendering and text summarization are owned
//! by vendors. Each gets a trait here plus an `Unconfigured*` stand-in that
//! fails with [`AppError::Upstream`], so the API starts without credentials
//! and the affected endpoints answer 502 until a real client is wired in.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Order as created by the payment gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for `amount` (smallest currency unit)
    async fn create_order(
        &self,
        amount: i64,
        currency: String,
        receipt: String,
    ) -> AppResult<GatewayOrder>;

    /// Check the signature the client received after paying
    async fn verify_signature(
        &self,
        order_id: String,
        payment_id: String,
        signature: String,
    ) -> AppResult<bool>;
}

/// Result of a media upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub url: String,
    #[schema(example = "image")]
    pub media_type: String,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, content_type: String) -> AppResult<UploadedMedia>;
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CertificateRenderer: Send + Sync {
    /// Render the certificate's HTML view to PDF bytes
    async fn render_pdf(&self, certificate_id: String) -> AppResult<Vec<u8>>;
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: String) -> AppResult<String>;
}

pub struct UnconfiguredPaymentGateway;

#[async_trait]
impl PaymentGateway for UnconfiguredPaymentGateway {
    async fn create_order(&self, _: i64, _: String, _: String) -> AppResult<GatewayOrder> {
        Err(AppError::upstream("payment gateway is not configured"))
    }

    async fn verify_signature(&self, _: String, _: String, _: String) -> AppResult<bool> {
        Err(AppError::upstream("payment gateway is not configured"))
    }
}

pub struct UnconfiguredMediaHost;

#[async_trait]
impl MediaHost for UnconfiguredMediaHost {
    async fn upload(&self, _: Vec<u8>, _: String) -> AppResult<UploadedMedia> {
        Err(AppError::upstream("media host is not configured"))
    }
}

pub struct UnconfiguredRenderer;

#[async_trait]
impl CertificateRenderer for UnconfiguredRenderer {
    async fn render_pdf(&self, _: String) -> AppResult<Vec<u8>> {
        Err(AppError::upstream("certificate renderer is not configured"))
    }
}

pub struct UnconfiguredSummarizer;

#[async_trait]
impl Summarizer for UnconfiguredSummarizer {
    async fn summarize(&self, _: String) -> AppResult<String> {
        Err(AppError::upstream("summarizer is not configured"))
    }
}
