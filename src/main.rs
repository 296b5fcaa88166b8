use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use portal_auth::config::{
    api_base_from_env_value, otp_ttl_from_env_value, temp_password_from_env_value,
    timeout_from_env_value,
};
use portal_auth::{AuthConfig, AuthService, HttpOtpClient};
use portal_core::config::data_dir_from_env_value;
use portal_core::{AppData, CoreConfig, FileStore, Store};

/// Main entry point for the portal
///
/// Resolves configuration once, loads (or seeds) every collection from the file store and serves
/// the REST API.
///
/// # Environment Variables
/// - `PORTAL_DATA_DIR`: Directory holding one JSON document per collection (default: "portal_data")
/// - `PORTAL_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PORTAL_AUTH_API_BASE`: Base URL of the OTP/e-mail service (default: "http://localhost:5000")
/// - `PORTAL_OTP_TTL_SECS`: Lifetime of a pending login code; empty disables it (default: 600)
/// - `PORTAL_AUTH_TIMEOUT_SECS`: Timeout for calls to the OTP service; `0` disables it (default: 15)
/// - `PORTAL_TEMP_PASSWORD`: Password for staff-created accounts (default: "Temp123!")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a configuration value is invalid,
/// - the data directory cannot be read or seeded, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portal=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("PORTAL_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let core_cfg = CoreConfig::new(data_dir_from_env_value(
        std::env::var("PORTAL_DATA_DIR").ok(),
    ))?;
    let auth_cfg = AuthConfig::new(
        api_base_from_env_value(std::env::var("PORTAL_AUTH_API_BASE").ok()),
        otp_ttl_from_env_value(std::env::var("PORTAL_OTP_TTL_SECS").ok())?,
        timeout_from_env_value(std::env::var("PORTAL_AUTH_TIMEOUT_SECS").ok())?,
        temp_password_from_env_value(std::env::var("PORTAL_TEMP_PASSWORD").ok()),
    )?;

    tracing::info!("++ Data directory {}", core_cfg.data_dir().display());
    tracing::info!("++ OTP service at {}", auth_cfg.api_base());

    let store: Arc<dyn Store> = Arc::new(FileStore::new(core_cfg.data_dir()));
    let data = AppData::load(store.clone())?;
    let otp = Arc::new(HttpOtpClient::new(&auth_cfg)?);
    let auth = AuthService::load(store, auth_cfg, otp)?;

    let app = api_rest::router(AppState::new(data, auth));

    tracing::info!("++ Starting portal REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
