//! OTP injection hook service
//!
//! HTTP service a proxy tool calls once per outgoing request to get the
//! request back with a fresh SMS OTP injected

use anyhow::{Context, Result};
use otpinject::config::{AppConfig, Settings};
use otpinject::handlers::{create_router, AppState};
use otpinject::utils::logging::init_logging;
use otpinject::SESSION_ACTION_NAME;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Environment first, it carries the log settings and the config path
    let settings = Settings::new().context("Failed to load server settings")?;
    init_logging(&settings.logging)?;
    info!("{}", otpinject::version_info());

    let app_config = AppConfig::load_default(settings.config_path.as_deref())
        .context("Failed to load configuration")?;
    info!("📁 Configuration loaded");

    let addr = app_config.listen_addr();
    let state = Arc::new(
        AppState::from_config(settings, app_config)
            .context("Failed to initialize application state")?,
    );
    if state.settings.is_dev_mode() {
        info!("Development mode enabled");
    }
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 OTP injection service started!");
    info!("📝 Health check: http://{}/health", addr);
    info!("🔄 Session action '{}': http://{}/v1/session-action", SESSION_ACTION_NAME, addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    Ok(())
}
