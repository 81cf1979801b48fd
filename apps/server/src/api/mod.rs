//! HTTP API: router assembly

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use crate::{admin_auth::admin_middleware, state::AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use response::ApiResponse;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the full application router.
pub fn create_router(state: AppState) -> Router {
    let admin = routes::admin_routes().route_layer(from_fn_with_state(
        state.clone(),
        admin_middleware,
    ));

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(routes::business_routes())
        .nest("/admin", admin)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.server.max_request_body_size))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(&state.config.server.cors_origins) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::failure("Not found")),
    )
}
