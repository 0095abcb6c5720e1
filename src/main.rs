//! Superlists server.
//!
//! # Environment Variables
//!
//! - `HOST` / `PORT`: bind address (default `0.0.0.0:8000`)
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default `5`)
//! - `SITE_URL`: base of emailed login links
//! - `EMAIL_FROM`: sender of login emails
//! - `LOGIN_TOKEN_TTL_MINUTES`: login link lifetime (default `60`)
//! - `SECURE_COOKIES`: mark the session cookie `Secure`
//! - `RUST_LOG`: logging filter (e.g. `superlists=debug,tower_http=info`)
//! - `LOG_FORMAT`: `json` for JSON log lines

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use superlists::api::{AppState, Templates, create_router, serve};
use superlists::application::AccountSettings;
use superlists::infrastructure::{AppConfig, LogMailer, RepositoryFactory};

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "superlists=debug,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Starting Superlists");

    let config = AppConfig::from_env()?;
    tracing::info!(
        storage_mode = ?config.repository.storage_mode,
        site_url = %config.site_url,
        "Configuration loaded"
    );

    let factory = RepositoryFactory::new(config.repository.clone());
    let repositories = factory.create().await?;
    tracing::info!(
        storage_mode = ?factory.config().storage_mode,
        "Repositories initialized successfully"
    );

    let state = AppState::new(
        repositories,
        Arc::new(LogMailer),
        Templates::new()?,
        AccountSettings::from_config(&config),
    )
    .with_secure_cookies(config.secure_cookies);

    serve(create_router(state), &config.bind_address()).await?;
    Ok(())
}
