//! Certificate handlers. Everything except `/mine` is public.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CertificateVerification, CertificateView};
use crate::errors::AppResult;

/// Routes mounted under `/certificates`
pub fn certificate_routes() -> Router<AppState> {
    Router::new()
        .route("/mine", get(my_certificates))
        .route("/verify/:certificate_id", get(verify_certificate))
        .route("/:certificate_id", get(get_certificate))
        .route("/:certificate_id/pdf", get(certificate_pdf))
}

#[utoipa::path(
    get,
    path = "/certificates/mine",
    tag = "Certificates",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Caller's certificates", body = [CertificateView]))
)]
pub async fn my_certificates(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<CertificateView>>> {
    let certificates = state
        .services
        .certificates()
        .list_certificates(user.id)
        .await?;
    Ok(Json(certificates))
}

#[utoipa::path(
    get,
    path = "/certificates/{certificate_id}",
    tag = "Certificates",
    params(("certificate_id" = String, Path, description = "Public certificate id")),
    responses(
        (status = 200, description = "Certificate detail", body = CertificateView),
        (status = 404, description = "Unknown certificate")
    )
)]
pub async fn get_certificate(
    State(state): State<AppState>,
    Path(certificate_id): Path<String>,
) -> AppResult<Json<CertificateView>> {
    let certificate = state
        .services
        .certificates()
        .get_certificate(&certificate_id)
        .await?;
    Ok(Json(certificate))
}

/// Public verification. Unknown ids answer 200 with `isValid = false`.
#[utoipa::path(
    get,
    path = "/certificates/verify/{certificate_id}",
    tag = "Certificates",
    params(("certificate_id" = String, Path, description = "Public certificate id")),
    responses((status = 200, description = "Verification payload", body = CertificateVerification))
)]
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(certificate_id): Path<String>,
) -> AppResult<Json<CertificateVerification>> {
    if let Some(cache) = &state.cache {
        match cache.get_certificate_verification(&certificate_id).await {
            Ok(Some(cached)) => {
                tracing::debug!(certificate_id = %certificate_id, "Certificate verification cache hit");
                return Ok(Json(cached));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Certificate cache read failed"),
        }
    }

    let verification = state
        .services
        .certificates()
        .verify(&certificate_id)
        .await?;

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.set_certificate_verification(&verification).await {
            tracing::warn!(error = %e, "Certificate cache write failed");
        }
    }

    Ok(Json(verification))
}

#[utoipa::path(
    get,
    path = "/certificates/{certificate_id}/pdf",
    tag = "Certificates",
    params(("certificate_id" = String, Path, description = "Public certificate id")),
    responses(
        (status = 200, description = "Rendered certificate", content_type = "application/pdf"),
        (status = 404, description = "Unknown certificate"),
        (status = 502, description = "Renderer unavailable")
    )
)]
pub async fn certificate_pdf(
    State(state): State<AppState>,
    Path(certificate_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let bytes = state
        .services
        .certificates()
        .render_pdf(&certificate_id)
        .await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}.pdf\"", certificate_id),
        ),
    ];
    Ok((headers, bytes))
}
