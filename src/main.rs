use actix_web::{middleware::Logger, web, App, HttpServer};
use actix_cors::Cors;
use nomadgo_auth::{configure, AppState, Settings, AppError};
use dotenv::dotenv;
use std::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[actix_web::main]
async fn main() -> nomadgo_auth::Result<()> {
    // Load environment variables
    dotenv().ok();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = Settings::new()?;
    info!("Configuration loaded successfully ({})", config.environment);

    if config.uses_development_secret() && !config.is_development() {
        warn!("JWT_SECRET is not set; tokens are signed with the development secret");
    }

    let state = AppState::new(config.clone()).await?;
    let data = web::Data::new(state.clone());

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Listening on http://{}:{}/api", config.server.host, config.server.port);

    let cors_config = config.cors.clone();
    let result = HttpServer::new(move || {
        let cors = if cors_config.allow_any_origin {
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .expose_any_header()
                .supports_credentials()
                .max_age(cors_config.max_age as usize)
        } else {
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(configure)
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()));

    info!("Server stopped, releasing store connection");
    state.shutdown().await?;

    result
}
