//! The vibes API server (`vibes serve`)
//!
//! Serves the four JSON endpoints the client consumes, keeping one session per
//! user in memory and delegating text generation to an [`Oracle`].

pub mod oracle;
pub mod prompts;
pub mod routes;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::api::types::{CLARIFY_VIBES, GET_FORTUNE, GET_INITIAL_VIBE, UPDATE_STATE};
use crate::core::config::ServerConfig;
use crate::error::{Result, VibesError};

pub use oracle::{CannedOracle, OpenAiOracle, Oracle};
pub use store::SessionStore;

/// Shared server state
pub struct AppState {
    pub store: SessionStore,
    pub oracle: Arc<dyn Oracle>,
    /// Every caller maps to the same user
    pub single_user: bool,
}

impl AppState {
    pub fn new(oracle: Arc<dyn Oracle>, single_user: bool) -> Self {
        Self {
            store: SessionStore::new(),
            oracle,
            single_user,
        }
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(GET_INITIAL_VIBE, get(routes::get_initial_vibe))
        .route(GET_FORTUNE, get(routes::get_fortune))
        .route(CLARIFY_VIBES, post(routes::clarify_vibes))
        .route(UPDATE_STATE, post(routes::update_state))
        .with_state(state)
}

/// Pick the oracle: canned when asked for or when no OpenAI key is available
pub fn select_oracle(config: &ServerConfig) -> Arc<dyn Oracle> {
    if config.canned_oracle {
        return Arc::new(CannedOracle);
    }

    match OpenAiOracle::from_env(&config.oracle_model) {
        Some(oracle) => Arc::new(oracle),
        None => {
            tracing::warn!("OPENAI_API_KEY is not set, falling back to the canned oracle");
            Arc::new(CannedOracle)
        }
    }
}

/// Serve until the process is stopped
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let addr: SocketAddr = config
        .bind
        .parse()
        .map_err(|_| VibesError::Config(format!("Invalid bind address '{}'", config.bind)))?;

    let oracle = select_oracle(config);
    tracing::info!(oracle = oracle.name(), single_user = config.single_user, "starting vibes server");

    let state = Arc::new(AppState::new(oracle, config.single_user));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
