use crate::api::handlers::admin;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Routes mounted under `/admin`; the admin session middleware is applied by the caller.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(admin::get_session))
        // Verification toggle
        .route("/businesses/verify", post(admin::verify_business))
        // Listing and counts
        .route("/businesses", get(admin::list_businesses))
        .route("/businesses/stats", get(admin::get_verification_stats))
        .route(
            "/businesses/:id/verification",
            get(admin::get_verification_status),
        )
}
