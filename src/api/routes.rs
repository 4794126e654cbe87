//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    assessment_routes, auth_routes, certificate_routes, conversation_routes, course_routes,
    enrollment_routes, lesson_routes, media_routes, payment_routes, presence_routes, quiz_routes,
    user_routes, ws_handler,
};
use super::middleware::{auth_middleware, rate_limit_auth_middleware, rate_limit_middleware};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Every route in these groups requires a session
    let protected = [
        ("/users", user_routes()),
        ("/lessons", lesson_routes()),
        ("/enrollments", enrollment_routes()),
        ("/payments", payment_routes()),
        ("/assessments", assessment_routes()),
        ("/quizzes", quiz_routes()),
        ("/conversations", conversation_routes()),
        ("/presence", presence_routes()),
        ("/media", media_routes()),
    ];

    // Mixed public and authenticated routes; handlers extract the user
    let public = [
        ("/courses", course_routes()),
        ("/certificates", certificate_routes()),
    ];

    let mut router = Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Authentication routes (stricter rate limiting)
        .nest(
            "/auth",
            auth_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_auth_middleware,
            )),
        )
        .route("/ws", get(ws_handler));

    for (path, routes) in protected {
        router = router.nest(
            path,
            routes
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                ))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit_middleware,
                )),
        );
    }

    for (path, routes) in public {
        router = router.nest(
            path,
            routes.route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            )),
        );
    }

    router
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Course Market API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

/// Service status; failure details are logged, never returned
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
}

impl ServiceStatus {
    fn from_check<E: std::fmt::Display>(service: &str, result: Option<Result<(), E>>) -> Self {
        let status = match result {
            Some(Ok(())) => "healthy",
            Some(Err(e)) => {
                tracing::error!(service, error = %e, "Health check failed");
                "unhealthy"
            }
            None => "unconfigured",
        };
        ServiceStatus { status }
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_check = match &state.database {
        Some(database) => Some(database.ping().await),
        None => None,
    };
    let redis_check = match &state.cache {
        Some(cache) => Some(cache.ping().await),
        None => None,
    };

    let db_status = ServiceStatus::from_check("database", db_check);
    let redis_status = ServiceStatus::from_check("redis", redis_check);

    let all_healthy = db_status.status == "healthy" && redis_status.status == "healthy";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth {
            database: db_status,
            redis: redis_status,
        },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
