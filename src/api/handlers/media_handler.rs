//! Media upload for lesson and question attachments.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    routing::post,
    Router,
};

use crate::api::middleware::{require_instructor, CurrentUser};
use crate::api::AppState;
use crate::errors::{AppError, AppResult};
use crate::infra::external::UploadedMedia;
use crate::types::Created;

/// Routes mounted under `/media`; all require authentication
pub fn media_routes() -> Router<AppState> {
    Router::new().route("/", post(upload_media))
}

/// Upload the raw request body; `Content-Type` selects the media type
#[utoipa::path(
    post,
    path = "/media",
    tag = "Media",
    security(("bearer_auth" = [])),
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "Raw image, video or PDF bytes"),
    responses(
        (status = 201, description = "Hosted URL", body = UploadedMedia),
        (status = 400, description = "Empty body or unsupported content type"),
        (status = 502, description = "Media host unavailable")
    )
)]
pub async fn upload_media(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Created<UploadedMedia>> {
    require_instructor(&user)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::bad_request("Content-Type header is required"))?
        .to_string();

    let uploaded = state
        .services
        .catalog()
        .upload_media(body.to_vec(), content_type)
        .await?;
    Ok(Created(uploaded))
}
