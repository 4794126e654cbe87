//! JWT authentication middleware and extractor.
//!
//! The token is read from `Authorization: Bearer` or, for browser clients,
//! the `token` session cookie.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::UserRole;
use crate::errors::AppError;

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_instructor(&self) -> bool {
        self.role.is_instructor()
    }
}

/// Session token from the Authorization header, falling back to the cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Verify a raw token into the request's user.
pub fn authenticate(state: &AppState, token: &str) -> Result<CurrentUser, AppError> {
    let claims = state.services.auth().verify_token(token)?;
    Ok(CurrentUser {
        id: claims.sub,
        role: claims.role(),
        email: claims.email,
    })
}

/// JWT authentication middleware.
///
/// Validates the session token, then injects the CurrentUser into the
/// request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let current_user = authenticate(&state, &token)?;

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Reuses the middleware's user when present; otherwise authenticates the
/// request itself, so routes outside the middleware can take `CurrentUser`
/// or `Option<CurrentUser>`.
#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        let token = session_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        authenticate(state, &token)
    }
}

/// Require instructor role, returns Forbidden error otherwise.
pub fn require_instructor(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_instructor() {
        Ok(())
    } else {
        Err(AppError::forbidden("Instructor role required"))
    }
}
