//! Backoffice API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod session_cookie;
mod state;

use backoffice_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = match config.database_url.as_deref() {
        Some(database_url) => Some(api_services::connect_and_migrate(database_url).await?),
        None => None,
    };

    if config.migrate_only {
        if pool.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to run migrations".to_owned(),
            ));
        }
        info!("database migrations applied successfully");
        return Ok(());
    }

    let services = api_services::build_api_services(&config, pool.as_ref())?;
    if config.dev_seed {
        dev_seed::run(&services).await?;
    }

    let app = api_router::build_router(services.app_state, &config.frontend_url)?;
    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, admin_uri = %config.admin.uri, "backoffice-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
