//! Admin verification handlers.
//!
//! Every route here sits behind `admin_middleware`, which inserts the
//! authenticated `AdminPrincipal` as a request extension.

use super::parse_positive;
use crate::{
    admin_auth::AdminPrincipal,
    api::response::ApiResponse,
    models::{not_blank, Business},
    state::AppState,
    Error, Result,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub async fn get_session(Extension(principal): Extension<AdminPrincipal>) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok(principal))).into_response()
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[validate(custom(function = "not_blank"))]
    pub business_id: String,
    pub verified: bool,
}

#[derive(Debug, Serialize)]
pub struct VerifyResult {
    pub success: bool,
    pub business: Business,
}

pub async fn verify_business(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    body: std::result::Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) =
        body.map_err(|e| Error::Validation(format!("Invalid request body: {}", e.body_text())))?;
    request
        .validate()
        .map_err(|_| Error::Validation("businessId is required".into()))?;

    let business_id = request.business_id.trim();
    let business = state
        .verification_service
        .set_verified(business_id, request.verified, &principal.id)
        .await?;

    tracing::info!(
        business_id,
        admin_id = %principal.id,
        verified = request.verified,
        "Admin changed verification status"
    );

    let message = if request.verified {
        "Business verified successfully"
    } else {
        "Business unverified successfully"
    };
    Ok((
        StatusCode::OK,
        Json(
            ApiResponse::ok(VerifyResult {
                success: true,
                business,
            })
            .with_message(message),
        ),
    )
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBusinessesQuery {
    pub status: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BusinessList {
    pub businesses: Vec<Business>,
    pub total: i64,
}

/// `status=all` (default) pages through every record; `verified` and
/// `unverified` return the dashboard lists capped by `limit`.
pub async fn list_businesses(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListBusinessesQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = query.map_err(|e| Error::Validation(e.body_text()))?;
    let limit = parse_positive("limit", params.limit.as_deref())?;

    let response = match params.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => {
            let page = parse_positive("page", params.page.as_deref())?.unwrap_or(1);
            let page_size = parse_positive("pageSize", params.page_size.as_deref())?;
            let page = state.search_service.list_all(page, page_size).await?;
            Json(ApiResponse::ok(page)).into_response()
        }
        Some("verified") => {
            let businesses = state.verification_service.list_verified(limit).await?;
            listed(businesses)
        }
        Some("unverified") => {
            let businesses = state.verification_service.list_unverified(limit).await?;
            listed(businesses)
        }
        Some(_) => {
            return Err(Error::Validation(
                "Status must be one of \"all\", \"verified\" or \"unverified\"".into(),
            ))
        }
    };
    Ok(response)
}

fn listed(businesses: Vec<Business>) -> Response {
    let total = businesses.len() as i64;
    Json(ApiResponse::ok(BusinessList { businesses, total })).into_response()
}

pub async fn get_verification_stats(State(state): State<AppState>) -> Result<Response> {
    let stats = state.verification_service.stats().await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(stats))).into_response())
}

pub async fn get_verification_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let status = state
        .verification_service
        .get_status(&id)
        .await?
        .ok_or(Error::BusinessNotFound { id })?;

    Ok((StatusCode::OK, Json(ApiResponse::ok(status))).into_response())
}
