use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    app_state::AppState,
    config::read_config,
    factory::{create_push_service, validate_vapid},
};

mod adapters;
mod app_state;
mod config;
mod domain;
mod factory;
mod repositories;
mod router;
mod routes;

#[tokio::main]
async fn main() {
    dotenvy::from_filename("./push-api/.env.local").ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("push_api=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match read_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            std::process::exit(1);
        }
    };

    let application_server_key = match validate_vapid(&config.vapid) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let push_service = match create_push_service(&config).await {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to start push service: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(push_service, application_server_key);
    let app = router::create(app_state, &config.application.app_url);

    let addr = format!("{}:{}", config.application.host, config.application.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on {}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
