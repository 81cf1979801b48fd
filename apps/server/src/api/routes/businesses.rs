use crate::api::handlers::businesses;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn business_routes() -> Router<AppState> {
    Router::new()
        .route("/businesses/search", get(businesses::search_businesses))
        .route("/businesses/:id", get(businesses::get_business))
        .route("/businesses/:id/qr", get(businesses::get_business_qr))
}
