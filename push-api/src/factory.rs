//! Composition root: builds the push service from settings.
//!
//! This is the ONLY place that imports concrete outbound adapters.

use std::sync::Arc;

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use push_contract::{ApplicationServerKey, KeyError};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::{
    adapters::outbound::{
        memory::InMemorySubscriptionStore,
        postgres::PostgresSubscriptionStore,
        web_push::{VapidDetails, WebPushTransport},
    },
    config::{Settings, StoreBackend, VapidSettings},
    domain::{ports::inbound::PushService, services::PushServiceImpl},
    repositories::PushSubscriptionRepositoryImpl,
};

const VAPID_PRIVATE_KEY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid VAPID public key: {0}")]
    VapidPublicKey(#[from] KeyError),
    #[error("invalid VAPID private key: {0}")]
    VapidPrivateKey(String),
    #[error("VAPID subject must be a mailto: or https: URI, got '{0}'")]
    VapidSubject(String),
    #[error("store backend 'postgres' requires a database section")]
    MissingDatabase,
    #[error("failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("failed to create push client: {0}")]
    PushClient(#[from] web_push::WebPushError),
}

/// Checks the VAPID configuration and returns the decoded public key.
pub fn validate_vapid(vapid: &VapidSettings) -> Result<ApplicationServerKey, StartupError> {
    if !(vapid.subject.starts_with("mailto:") || vapid.subject.starts_with("https:")) {
        return Err(StartupError::VapidSubject(vapid.subject.clone()));
    }

    let public_key = ApplicationServerKey::from_base64url(&vapid.public_key)?;

    let private_key = BASE64_URL_SAFE_NO_PAD
        .decode(vapid.private_key.trim().trim_end_matches('='))
        .map_err(|e| StartupError::VapidPrivateKey(e.to_string()))?;
    if private_key.len() != VAPID_PRIVATE_KEY_LEN {
        return Err(StartupError::VapidPrivateKey(format!(
            "expected {VAPID_PRIVATE_KEY_LEN} bytes, got {}",
            private_key.len()
        )));
    }

    Ok(public_key)
}

pub async fn create_push_service(
    settings: &Settings,
) -> Result<Arc<dyn PushService>, StartupError> {
    let transport = Arc::new(WebPushTransport::new(VapidDetails {
        subject: settings.vapid.subject.clone(),
        private_key: settings.vapid.private_key.clone(),
        ttl_seconds: settings.vapid.ttl_seconds,
    })?);

    let service: Arc<dyn PushService> = match settings.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory subscription store");
            let store = Arc::new(InMemorySubscriptionStore::new());
            Arc::new(PushServiceImpl::new(store, transport))
        }
        StoreBackend::Postgres => {
            let database = settings
                .database
                .as_ref()
                .ok_or(StartupError::MissingDatabase)?;
            let pool = PgPoolOptions::new()
                .connect_with(database.with_db())
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;

            tracing::info!(
                "Using postgres subscription store for owner '{}'",
                settings.store.owner
            );
            let repo = Arc::new(PushSubscriptionRepositoryImpl::new(pool));
            let store = Arc::new(PostgresSubscriptionStore::new(
                repo,
                settings.store.owner.clone(),
            ));
            Arc::new(PushServiceImpl::new(store, transport))
        }
    };

    Ok(service)
}
