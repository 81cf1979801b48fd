//! Admin authentication for `/admin/*` endpoints.
//!
//! Sessions are issued by the external auth provider as HS256-signed tokens.
//! This module only validates them and turns the claims into an explicit
//! [`AdminPrincipal`] that handlers pass on to the verification service.
//!
//! Tokens are accepted from `Authorization: Bearer <token>` or from the
//! `verisl_admin_session` cookie.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::{config::AuthConfig, state::AppState, Error};

const ADMIN_SESSION_COOKIE: &str = "verisl_admin_session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAuthError {
    MissingSession,
    InvalidSession(String),
}

impl From<AdminAuthError> for Error {
    fn from(err: AdminAuthError) -> Self {
        match err {
            AdminAuthError::MissingSession => Error::Unauthorized("Missing admin session".into()),
            AdminAuthError::InvalidSession(msg) => {
                Error::Unauthorized(format!("Invalid admin session: {msg}"))
            }
        }
    }
}

/// The authenticated admin making a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPrincipal {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AdminSessionClaims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aud: Option<String>,
    iat: usize,
    exp: usize,
}

#[derive(Clone)]
pub struct AdminAuthManager {
    secret: Vec<u8>,
    issuer: Option<String>,
    audience: Option<String>,
}

impl AdminAuthManager {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = match &config.jwt_secret {
            Some(s) if !s.trim().is_empty() => s.as_bytes().to_vec(),
            _ => {
                tracing::warn!(
                    "`auth.jwt_secret` is not set; using ephemeral secret (provider-issued tokens will be rejected)"
                );
                format!("{}{}", Uuid::new_v4(), Uuid::new_v4()).into_bytes()
            }
        };

        Self {
            secret,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    pub fn cookie_name(&self) -> &'static str {
        ADMIN_SESSION_COOKIE
    }

    /// Mint a token for `admin`, valid for `ttl_seconds`.
    ///
    /// Used by the operator CLI and tests; production tokens come from the
    /// auth provider.
    pub fn issue_token(
        &self,
        admin: &AdminPrincipal,
        ttl_seconds: u64,
    ) -> Result<String, AdminAuthError> {
        let now = now_epoch_seconds();
        let claims = AdminSessionClaims {
            sub: admin.id.clone(),
            email: admin.email.clone(),
            name: admin.name.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp: now.saturating_add(ttl_seconds as usize),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AdminAuthError::InvalidSession(e.to_string()))
    }

    pub fn validate_session(&self, headers: &HeaderMap) -> Result<AdminPrincipal, AdminAuthError> {
        if let Some(authz) = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = authz
                .strip_prefix("Bearer ")
                .or_else(|| authz.strip_prefix("bearer "))
            {
                return self.validate_token(token.trim());
            }
        }

        let token = extract_cookie_value(headers, self.cookie_name())
            .ok_or(AdminAuthError::MissingSession)?;
        self.validate_token(&token)
    }

    pub fn validate_token(&self, token: &str) -> Result<AdminPrincipal, AdminAuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        match &self.issuer {
            Some(iss) => validation.set_issuer(&[iss]),
            None => validation.iss = None,
        }
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        let data = decode::<AdminSessionClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map_err(|e| AdminAuthError::InvalidSession(e.to_string()))?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(AdminAuthError::InvalidSession("empty subject".into()));
        }
        Ok(AdminPrincipal {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
        })
    }
}

/// Admin middleware for `/admin/*`.
///
/// Rejects unauthenticated requests with 401 before any body is read and
/// stores the [`AdminPrincipal`] in the request extensions.
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if req.method() == axum::http::Method::OPTIONS {
        return next.run(req).await;
    }

    match state.admin_auth.validate_session(req.headers()) {
        Ok(principal) => {
            tracing::debug!(admin_id = %principal.id, "Admin session validated");
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => Error::from(e).into_response(),
    }
}

fn now_epoch_seconds() -> usize {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize
}

fn extract_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let Some((k, v)) = part.trim().split_once('=') else {
            continue;
        };
        if k.trim() == name {
            return Some(v.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn manager() -> AdminAuthManager {
        AdminAuthManager::new(&AuthConfig {
            jwt_secret: Some("test-secret-0123456789".into()),
            issuer: None,
            audience: None,
        })
    }

    fn admin() -> AdminPrincipal {
        AdminPrincipal {
            id: "admin-1".into(),
            email: Some("admin@verisl.test".into()),
            name: Some("Registry Admin".into()),
        }
    }

    #[test]
    fn bearer_token_round_trips_to_principal() {
        let auth = manager();
        let token = auth.issue_token(&admin(), 60).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(auth.validate_session(&headers).unwrap(), admin());
    }

    #[test]
    fn cookie_token_is_accepted() {
        let auth = manager();
        let token = auth.issue_token(&admin(), 60).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; verisl_admin_session={token}")).unwrap(),
        );
        assert_eq!(auth.validate_session(&headers).unwrap().id, "admin-1");
    }

    #[test]
    fn missing_and_foreign_tokens_are_rejected() {
        let auth = manager();
        assert_eq!(
            auth.validate_session(&HeaderMap::new()).unwrap_err(),
            AdminAuthError::MissingSession
        );

        let other = AdminAuthManager::new(&AuthConfig {
            jwt_secret: Some("another-secret-abcdefgh".into()),
            issuer: None,
            audience: None,
        });
        let token = other.issue_token(&admin(), 60).unwrap();
        assert!(matches!(
            auth.validate_token(&token),
            Err(AdminAuthError::InvalidSession(_))
        ));
    }

    #[test]
    fn issuer_is_enforced_when_configured() {
        let strict = AdminAuthManager::new(&AuthConfig {
            jwt_secret: Some("test-secret-0123456789".into()),
            issuer: Some("https://auth.verisl.test".into()),
            audience: None,
        });
        let token = manager().issue_token(&admin(), 60).unwrap();
        assert!(strict.validate_token(&token).is_err());

        let token = strict.issue_token(&admin(), 60).unwrap();
        assert!(strict.validate_token(&token).is_ok());
    }
}
