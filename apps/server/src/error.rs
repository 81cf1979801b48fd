//! Error types for the registry server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::response::ApiResponse;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Business not found: {id}")]
    BusinessNotFound { id: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Registration number already exists: {registration_number}")]
    DuplicateRegistration { registration_number: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    #[error("QR generation failed: {0}")]
    QrGeneration(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::BusinessNotFound { .. } => StatusCode::NOT_FOUND,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::DuplicateRegistration { .. } => StatusCode::CONFLICT,
            Error::Database(_)
            | Error::Migration(_)
            | Error::SearchFailed(_)
            | Error::VerificationFailed(_)
            | Error::QrGeneration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to API clients.
    ///
    /// Server-side failures get a fixed message per operation; the underlying
    /// cause only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::BusinessNotFound { .. } => "Business not found".to_string(),
            Error::Unauthorized(_) => "Unauthorized. Admin authentication required.".to_string(),
            Error::DuplicateRegistration { registration_number } => {
                format!("Registration number {registration_number} is already registered")
            }
            Error::SearchFailed(_) => "Failed to search businesses".to_string(),
            Error::VerificationFailed(_) => "Failed to update verification status".to_string(),
            Error::QrGeneration(_) => "Failed to generate QR code".to_string(),
            Error::Database(_) | Error::Migration(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// True when the error came from the store or encoder rather than the caller.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let mut response =
            (status, Json(ApiResponse::<()>::failure(self.public_message()))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}
