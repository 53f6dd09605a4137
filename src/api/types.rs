//! Wire payloads of the vibes REST API
//!
//! `get_initial_vibe` returns and `update_state` accepts the full
//! [`VibeSession`](crate::core::session::VibeSession) record; the remaining
//! endpoints exchange the small bodies defined here.

use serde::{Deserialize, Serialize};

/// GET: current session for the caller
pub const GET_INITIAL_VIBE: &str = "/api/get_initial_vibe";
/// GET: a freshly generated fortune
pub const GET_FORTUNE: &str = "/api/get_fortune";
/// POST: answer a question about a fortune
pub const CLARIFY_VIBES: &str = "/api/clarify_vibes";
/// POST: persist the caller's session
pub const UPDATE_STATE: &str = "/api/update_state";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortuneResponse {
    pub fortune: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarifyRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub fortune: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarifyResponse {
    pub answer: String,
}

/// Body of every server-side failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
