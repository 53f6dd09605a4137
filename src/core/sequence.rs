//! The reveal sequence, synchronised with the remote API
//!
//! Local transitions are applied optimistically before the network call.
//! A failed fetch abandons the update: nothing is rolled back and nothing is
//! persisted. A failed persist is logged and never propagates.

use std::sync::Arc;

use crate::api::VibesApi;
use crate::core::session::VibeSession;
use crate::error::Result;

/// Fetch the caller's session. The result replaces the local copy as-is.
pub async fn load_initial<A: VibesApi + ?Sized>(api: &A) -> Result<VibeSession> {
    let session = api.get_initial_vibe().await?;
    tracing::info!(stage = session.stage().label(), "vibe session loaded");
    Ok(session)
}

/// Fetch a fortune for a session already in the revealed stage, then persist.
pub async fn finish_reveal<A: VibesApi + ?Sized>(api: &A, session: &mut VibeSession) -> Result<()> {
    let fortune = api.get_fortune().await?;
    session.complete_reveal(fortune);
    persist(api, session).await;
    Ok(())
}

/// Press the reveal button and fetch the fortune
pub async fn reveal<A: VibesApi + ?Sized>(
    api: &A,
    session: &mut VibeSession,
    now_ms: i64,
) -> Result<()> {
    let deadline = session.begin_reveal(now_ms);
    tracing::debug!(deadline, "reveal pressed");
    finish_reveal(api, session).await
}

/// Ask about the current fortune for a session already in the clarity stage,
/// then persist.
pub async fn finish_clarify<A: VibesApi + ?Sized>(api: &A, session: &mut VibeSession) -> Result<()> {
    let answer = api
        .clarify_vibes(&session.question, &session.fortune)
        .await?;
    session.complete_clarify(answer);
    persist(api, session).await;
    Ok(())
}

/// Submit a question and fetch its answer
pub async fn clarify<A: VibesApi + ?Sized>(
    api: &A,
    session: &mut VibeSession,
    question: &str,
) -> Result<()> {
    session.begin_clarify(question);
    tracing::debug!("clarity submitted");
    finish_clarify(api, session).await
}

/// Push the session to the server. Failures are logged, never returned.
pub async fn persist<A: VibesApi + ?Sized>(api: &A, session: &VibeSession) {
    match api.update_state(session).await {
        Ok(response) => tracing::debug!(%response, "update state response"),
        Err(e) => tracing::error!(error = %e, "failed to persist vibe session"),
    }
}

/// Fire-and-forget [`persist`] on the tokio runtime
pub fn persist_detached(api: Arc<dyn VibesApi>, session: VibeSession) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        persist(api.as_ref(), &session).await;
    })
}
