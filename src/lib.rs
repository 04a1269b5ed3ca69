pub mod auth;
pub mod config;
pub mod db;
pub mod error;

use std::sync::Arc;
use actix_web::{web, HttpResponse};
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::AuthService;
pub use db::{MemoryUserStore, MongoUserStore, User, UserStore};

/// Liveness only; the store is not consulted.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts the `/api` routes. Shared by the binary and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .route("/auth/register", web::post().to(auth::handlers::register))
            .route("/auth/login", web::post().to(auth::handlers::login))
            .route("/auth/me", web::get().to(auth::handlers::me)),
    );
}

/// Malformed or incomplete JSON bodies become 400 validation errors.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(error::ValidationError::single("body", err.to_string())).into()
    })
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub store: Arc<dyn UserStore>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    /// Connects the store named by `database.url`.
    pub async fn new(config: Settings) -> Result<Self> {
        let store: Arc<dyn UserStore> = if config.database.url.starts_with("memory://") {
            info!("Using in-memory user store");
            Arc::new(MemoryUserStore::new())
        } else {
            Arc::new(MongoUserStore::connect(&config.database).await?)
        };

        Self::with_store(config, store)
    }

    pub fn with_store(config: Settings, store: Arc<dyn UserStore>) -> Result<Self> {
        let auth_service = AuthService::from_settings(store.clone(), &config)?;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service: Arc::new(auth_service),
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.store.shutdown().await;
        Ok(())
    }
}
