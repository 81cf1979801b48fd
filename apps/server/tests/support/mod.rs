//! Shared harness for HTTP-level integration tests.
//!
//! Builds the full router over the in-memory record store and drives it with
//! `tower::ServiceExt::oneshot`, so no network or database is needed.

use std::{future::Future, pin::Pin, sync::Arc};

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use verisl::{
    admin_auth::AdminPrincipal,
    api::create_router,
    config::StoreBackend,
    db::{BusinessStore, InMemoryBusinessStore},
    models::{Business, NewBusiness},
    state::AppState,
    Config,
};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const ADMIN_ID: &str = "admin-1";

pub type TestFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Vec<u8>)> {
        self.request_with_extra_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Vec<u8>)> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, headers, bytes.to_vec()))
    }

    /// Send a request carrying a bearer token for [`ADMIN_ID`].
    pub async fn admin_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Vec<u8>)> {
        let authorization = format!("Bearer {}", self.admin_token()?);
        self.request_with_extra_headers(method, uri, body, &[("authorization", &authorization)])
            .await
    }

    pub fn admin_token(&self) -> anyhow::Result<String> {
        let principal = AdminPrincipal {
            id: ADMIN_ID.to_string(),
            email: Some("admin@verisl.test".to_string()),
            name: Some("Test Admin".to_string()),
        };
        Ok(self.state.admin_auth.issue_token(&principal, 3600).map_err(verisl::Error::from)?)
    }

    pub async fn seed(
        &self,
        name: &str,
        registration_number: &str,
        owner: &str,
    ) -> anyhow::Result<Business> {
        Ok(self
            .state
            .store
            .insert(NewBusiness::new(name, registration_number, owner))
            .await?)
    }

    pub async fn seed_verified(
        &self,
        name: &str,
        registration_number: &str,
    ) -> anyhow::Result<Business> {
        let business = self.seed(name, registration_number, "Owner").await?;
        Ok(self
            .state
            .verification_service
            .verify(&business.id, ADMIN_ID)
            .await?)
    }
}

pub fn test_config() -> anyhow::Result<Config> {
    let mut config = Config::defaults()?;
    config.database.backend = StoreBackend::Memory;
    config.database.run_migrations = false;
    config.auth.jwt_secret = Some(TEST_JWT_SECRET.to_string());
    config.public.base_url = "https://verify.example.sl".to_string();
    Ok(config)
}

pub async fn with_test_app<F>(test: F) -> anyhow::Result<()>
where
    F: for<'a> FnOnce(&'a TestApp) -> TestFuture<'a>,
{
    with_test_app_with_config(|_| {}, test).await
}

pub async fn with_test_app_with_config<C, F>(configure: C, test: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: for<'a> FnOnce(&'a TestApp) -> TestFuture<'a>,
{
    let mut config = test_config()?;
    configure(&mut config);

    let store: Arc<dyn BusinessStore> = Arc::new(InMemoryBusinessStore::new());
    run_test_app(config, store, test).await
}

/// Same as [`with_test_app`] but over a caller-supplied store.
pub async fn with_test_app_over_store<F>(store: Arc<dyn BusinessStore>, test: F) -> anyhow::Result<()>
where
    F: for<'a> FnOnce(&'a TestApp) -> TestFuture<'a>,
{
    run_test_app(test_config()?, store, test).await
}

async fn run_test_app<F>(config: Config, store: Arc<dyn BusinessStore>, test: F) -> anyhow::Result<()>
where
    F: for<'a> FnOnce(&'a TestApp) -> TestFuture<'a>,
{
    let state = AppState::with_store(config, store);
    let router = create_router(state.clone());
    let app = TestApp { state, router };

    test(&app).await
}

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "unexpected status for {context}");
}

pub fn json_body(body: &[u8]) -> anyhow::Result<Value> {
    Ok(serde_json::from_slice(body)?)
}
