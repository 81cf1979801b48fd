//! Public business lookup handlers.

use super::parse_positive;
use crate::{
    api::response::ApiResponse, models::Business, services::QrFormat, state::AppState, Error,
    Result,
};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub search_type: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchType {
    Name,
    RegistrationNumber,
}

impl SearchType {
    fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim).filter(|v| !v.is_empty()) {
            None | Some("name") => Ok(SearchType::Name),
            Some("registrationNumber") => Ok(SearchType::RegistrationNumber),
            Some(_) => Err(Error::Validation(
                "Type must be either \"name\" or \"registrationNumber\"".into(),
            )),
        }
    }
}

pub async fn search_businesses(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = query.map_err(|e| Error::Validation(e.body_text()))?;

    let text = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| Error::Validation("Query parameter is required".into()))?;
    let search_type = SearchType::parse(params.search_type.as_deref())?;
    let limit = parse_positive("limit", params.limit.as_deref())?;

    let result = match search_type {
        SearchType::Name => state.search_service.search_by_name(text, limit).await?,
        SearchType::RegistrationNumber => {
            state
                .search_service
                .search_by_registration_number(text)
                .await?
        }
    };

    let message = format!("Found {} business(es)", result.total);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(result).with_message(message)),
    )
        .into_response())
}

pub async fn get_business(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let business = find_business(&state, &id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(business).with_message("Business retrieved successfully")),
    )
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct QrQuery {
    pub width: Option<String>,
    pub height: Option<String>,
    pub format: Option<String>,
}

/// Scannable image of the business's public profile URL.
///
/// Shape is checked before existence so malformed ids never reach the store.
pub async fn get_business_qr(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: std::result::Result<Query<QrQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = query.map_err(|e| Error::Validation(e.body_text()))?;

    if !state.qr_service.is_valid_id(&id) {
        return Err(Error::Validation("Invalid business ID".into()));
    }
    let width = parse_positive("width", params.width.as_deref())?;
    let height = parse_positive("height", params.height.as_deref())?;
    let format = match params.format.as_deref().map(str::trim) {
        None | Some("") => QrFormat::default(),
        Some(raw) => raw.parse::<QrFormat>()?,
    };

    let business = find_business(&state, &id).await?;

    let qr_service = state.qr_service.clone();
    let image = {
        let id = id.clone();
        tokio::task::spawn_blocking(move || qr_service.generate(&id, width, height, format))
            .await
            .map_err(|e| Error::QrGeneration(format!("QR task failed: {e}")))??
    };

    let content_type = image.content_type();
    let disposition = format!(
        "inline; filename=\"{}-qr.{}\"",
        download_file_stem(&business.name),
        image.extension()
    );
    let cache_control = format!("public, max-age={}", state.config.qr.cache_max_age_seconds);

    let mut response = (StatusCode::OK, image.into_bytes()).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Ok(value) = HeaderValue::from_str(&cache_control) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

async fn find_business(state: &AppState, id: &str) -> Result<Business> {
    state
        .search_service
        .get_business_by_id(id)
        .await?
        .ok_or_else(|| Error::BusinessNotFound { id: id.to_string() })
}

/// Business name reduced to a header-safe file name stem.
fn download_file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            stem.push(c);
        } else if !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "business".to_string()
    } else {
        stem.to_string()
    }
}
