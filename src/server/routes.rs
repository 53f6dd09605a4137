//! HTTP handlers for the four vibes endpoints

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::types::{ClarifyRequest, ClarifyResponse, ErrorBody, FortuneResponse};
use crate::core::session::{now_millis, VibeSession};
use crate::error::VibesError;
use crate::server::AppState;

/// User id used when the server runs in single-user mode
pub const DEBUG_USER: &str = "debug_user";

type ApiFailure = (StatusCode, Json<ErrorBody>);

fn internal(context: &str, e: VibesError) -> ApiFailure {
    tracing::error!(error = %e, "{}", context);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: format!("{}. Please try again later.", context),
        }),
    )
}

fn malformed(context: &str, rejection: JsonRejection) -> ApiFailure {
    internal(context, VibesError::InvalidInput(rejection.body_text()))
}

/// Identify the caller: a fixed id in single-user mode, else a hash of the peer IP
pub fn user_id(state: &AppState, peer: Option<SocketAddr>) -> String {
    if state.single_user {
        return DEBUG_USER.to_string();
    }

    match peer {
        Some(addr) => {
            let mut hasher = DefaultHasher::new();
            addr.ip().hash(&mut hasher);
            format!("{:016x}", hasher.finish())
        }
        None => "anonymous".to_string(),
    }
}

pub async fn get_initial_vibe(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Json<VibeSession> {
    let user = user_id(&state, peer.map(|ConnectInfo(addr)| addr));
    tracing::info!(%user, "request for user vibe received");

    let session = state.store.current(&user, now_millis()).await;
    Json(session)
}

pub async fn get_fortune(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FortuneResponse>, ApiFailure> {
    let fortune = state
        .oracle
        .foretell()
        .await
        .map_err(|e| internal("An error occurred while generating your fortune", e))?;

    tracing::info!(oracle = state.oracle.name(), "fortune generated");
    Ok(Json(FortuneResponse { fortune }))
}

pub async fn clarify_vibes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ClarifyRequest>, JsonRejection>,
) -> Result<Json<ClarifyResponse>, ApiFailure> {
    tracing::info!("request for vibe clarification received");
    let Json(request) =
        payload.map_err(|e| malformed("An error occurred while clarifying your vibe", e))?;

    let answer = state
        .oracle
        .clarify(&request.fortune, &request.question)
        .await
        .map_err(|e| internal("An error occurred while clarifying your vibe", e))?;

    Ok(Json(ClarifyResponse { answer }))
}

pub async fn update_state(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<VibeSession>, JsonRejection>,
) -> Result<Json<VibeSession>, ApiFailure> {
    let user = user_id(&state, peer.map(|ConnectInfo(addr)| addr));
    let Json(session) =
        payload.map_err(|e| malformed("An error occurred while updating your state", e))?;

    let stored = state.store.update(&user, session).await;
    tracing::info!(%user, stage = stored.stage().label(), "user state updated");
    Ok(Json(stored))
}
