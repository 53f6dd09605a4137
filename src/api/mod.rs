//! vibes API client
//!
//! The client side of the four JSON endpoints:
//! - `get_initial_vibe`, `get_fortune`, `clarify_vibes`, `update_state`

pub mod client;
pub mod types;

pub use client::{VibesApi, VibesClient};
