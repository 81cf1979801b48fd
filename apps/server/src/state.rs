//! Shared application state

use crate::{
    admin_auth::AdminAuthManager,
    config::{Config, StoreBackend},
    db::{self, BusinessStore, InMemoryBusinessStore, PostgresBusinessStore},
    services::{QrService, SearchService, VerificationService},
    Result,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub enum StoreKind {
    /// Persist records in PostgreSQL.
    Postgres,
    /// Keep records in process memory (useful for tests).
    InMemory,
}

impl From<StoreBackend> for StoreKind {
    fn from(backend: StoreBackend) -> Self {
        match backend {
            StoreBackend::Postgres => StoreKind::Postgres,
            StoreBackend::Memory => StoreKind::InMemory,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppStateOptions {
    pub run_migrations: bool,
    pub store: StoreKind,
}

impl AppStateOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            run_migrations: config.database.run_migrations,
            store: config.database.backend.into(),
        }
    }
}

impl Default for AppStateOptions {
    fn default() -> Self {
        Self {
            run_migrations: true,
            store: StoreKind::Postgres,
        }
    }
}

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub admin_auth: Arc<AdminAuthManager>,
    pub store: Arc<dyn BusinessStore>,
    pub search_service: Arc<SearchService>,
    pub verification_service: Arc<VerificationService>,
    pub qr_service: Arc<QrService>,
}

impl AppState {
    /// Initialize the application state
    pub async fn new(config: Config) -> Result<Self> {
        let options = AppStateOptions::from_config(&config);
        Self::new_with_options(config, options).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        tracing::info!(store = ?options.store, "Initializing application state...");

        let store = open_store(&config, &options).await?;
        let state = Self::with_store(config, store);

        tracing::info!("Application state initialized successfully");
        Ok(state)
    }

    /// Assemble services around an existing store.
    pub fn with_store(config: Config, store: Arc<dyn BusinessStore>) -> Self {
        let config_arc = Arc::new(config);

        let search_service = Arc::new(SearchService::new(
            store.clone(),
            config_arc.search.clone(),
        ));
        let verification_service = Arc::new(VerificationService::new(store.clone()));
        let qr_service = Arc::new(QrService::new(
            config_arc.public_base_url(),
            config_arc.qr.clone(),
        ));
        let admin_auth = Arc::new(AdminAuthManager::new(&config_arc.auth));

        Self {
            config: config_arc,
            admin_auth,
            store,
            search_service,
            verification_service,
            qr_service,
        }
    }
}

/// Open the configured record store, running migrations when requested.
pub async fn open_store(config: &Config, options: &AppStateOptions) -> Result<Arc<dyn BusinessStore>> {
    match options.store {
        StoreKind::InMemory => {
            tracing::warn!("Using in-memory record store; records are lost on restart");
            Ok(Arc::new(InMemoryBusinessStore::new()))
        }
        StoreKind::Postgres => {
            let pool = db::connect(&config.database, &config.database.url).await?;
            if options.run_migrations {
                db::run_migrations(&pool).await?;
            }
            Ok(Arc::new(PostgresBusinessStore::new(pool)))
        }
    }
}
