pub mod audit;
pub mod auth;
pub mod common;
pub mod contabilidad;
pub mod edificios;
pub mod estructura;
pub mod geografia;
pub mod movimientos;
pub mod personal;
pub mod rbac;
pub mod ufv;
pub mod users;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ::common::types::Health;

use crate::openapi::ApiDoc;
use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok", service: "activos_fijos" })
}

/// Build the full application router: public, authenticated and docs routes
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    // Public routes
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    // Everything below requires a valid session; each route adds its own permission
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/cambiar-password", post(auth::change_password))
        .merge(users::router())
        .merge(rbac::router())
        .merge(audit::router())
        .merge(geografia::router())
        .merge(estructura::router())
        .merge(personal::router())
        .merge(contabilidad::router())
        .merge(ufv::router())
        .merge(edificios::router())
        .merge(movimientos::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    // Compose
    public
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // One span per request with method and path, at INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // Status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
