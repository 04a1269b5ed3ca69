use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use serde::Deserialize;
use std::env;

pub const DEVELOPMENT_SECRET: &str = "development_secret";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// `mongodb://...` for a live store, `memory://` for a process-local one.
    pub url: String,
    /// Used when the URL does not name a default database.
    pub name: String,
    pub create_email_index: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub token_expiry_hours: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_any_origin: bool,
    pub max_age: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

/// Deployment variables that predate the `APP_` scheme and win over every
/// other source.
const LEGACY_OVERRIDES: &[(&str, &str)] = &[
    ("MONGO_URL", "database.url"),
    ("JWT_SECRET", "auth.jwt_secret"),
    ("JWT_ALGORITHM", "auth.jwt_algorithm"),
    ("JWT_EXPIRATION_HOURS", "auth.token_expiry_hours"),
];

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("environment", "development")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8001)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.url", "mongodb://localhost:27017/nomadgo")?
            .set_default("database.name", "nomadgo")?
            .set_default("database.create_email_index", false)?
            .set_default("auth.jwt_secret", DEVELOPMENT_SECRET)?
            .set_default("auth.jwt_algorithm", "HS256")?
            .set_default("auth.token_expiry_hours", 24)?
            .set_default("auth.bcrypt_cost", bcrypt::DEFAULT_COST as i64)?
            .set_default("cors.allow_any_origin", true)?
            .set_default("cors.max_age", 3600)?

            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))

            // E.g., `APP_SERVER__PORT=5001` would set `Settings.server.port`
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true)
            );

        with_legacy_overrides(builder)?.build()?.try_deserialize()
    }

    /// Test defaults: in-memory store, cheapest bcrypt cost, one-hour tokens.
    #[doc(hidden)]
    pub fn new_for_test() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("environment", "test")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8001)?
            .set_default("server.workers", 1)?
            .set_default("database.url", "memory://")?
            .set_default("database.name", "nomadgo_test")?
            .set_default("database.create_email_index", false)?
            .set_default("auth.jwt_secret", "test_secret")?
            .set_default("auth.jwt_algorithm", "HS256")?
            .set_default("auth.token_expiry_hours", 1)?
            .set_default("auth.bcrypt_cost", 4)?
            .set_default("cors.allow_any_origin", true)?
            .set_default("cors.max_age", 3600)?
            .build()?
            .try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn uses_development_secret(&self) -> bool {
        self.auth.jwt_secret == DEVELOPMENT_SECRET
    }
}

fn with_legacy_overrides(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in LEGACY_OVERRIDES {
        builder = builder.set_override_option(*key, env::var(var).ok())?;
    }
    Ok(builder)
}
