//! HTTP handlers module
//!
//! Hook service endpoints: session action, on-demand OTP, settings management

pub mod health;
pub mod session;
pub mod settings;

use crate::config::{AppConfig, Settings};
use crate::middleware::{auth::auth_middleware, logging::request_logging_middleware};
use crate::providers::{MessageProvider, TwilioProvider};
use crate::services::{
    CredentialStore, JsonFileStore, KeyValueStore, MemoryStore, OtpFetcher, RuleStore, SessionAction,
};
use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Application state
pub struct AppState {
    pub settings: Settings,
    pub config: AppConfig,
    pub credentials: Arc<CredentialStore>,
    pub rules: Arc<RuleStore>,
    pub fetcher: OtpFetcher,
    pub action: Arc<SessionAction>,
}

impl AppState {
    /// Wire stores, fetcher and session action together
    pub fn new(
        settings: Settings,
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
        provider: Arc<dyn MessageProvider>,
    ) -> Result<Self> {
        let credentials = Arc::new(CredentialStore::load(storage.clone()));
        let rules = Arc::new(RuleStore::new(storage));
        let fetcher = OtpFetcher::new(provider, credentials.clone())
            .with_delay(Duration::from_millis(config.provider.fetch_delay_ms));
        let action = Arc::new(SessionAction::new(rules.clone(), fetcher.clone())?);

        Ok(Self {
            settings,
            config,
            credentials,
            rules,
            fetcher,
            action,
        })
    }

    /// Build state from configuration: file-backed settings and the Twilio REST provider
    pub fn from_config(settings: Settings, config: AppConfig) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = match config.store.resolve_path() {
            Some(path) => {
                info!("Settings store: {:?}", path);
                Arc::new(JsonFileStore::open(path)?)
            }
            None => {
                warn!("No settings path available, settings will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };
        let provider: Arc<dyn MessageProvider> = Arc::new(TwilioProvider::new(&config.provider)?);

        Self::new(settings, config, storage, provider)
    }
}

/// Create application router
pub fn create_router(state: Arc<AppState>) -> Router {
    health::mark_started();

    // Create middleware stack
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let api = Router::new()
        .route("/session-action", post(session::handle_session_action))
        .route("/otp", get(session::fetch_otp))
        .route(
            "/credentials",
            put(settings::update_credentials).delete(settings::clear_credentials),
        )
        .route("/credentials/export", get(settings::export_credentials))
        .route("/credentials/import", post(settings::import_credentials))
        .route("/rule", get(settings::get_rule).put(settings::save_rule))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/v1", api)
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .layer(middleware::from_fn_with_state(state.clone(), request_logging_middleware))
        .with_state(state)
        .layer(middleware_stack)
}
