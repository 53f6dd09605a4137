//! Core functionality for vibes
//!
//! This module contains the logic shared by the TUI and CLI:
//! - Application configuration
//! - The vibe session and its reveal stages
//! - Countdown to the next fortune
//! - The reveal and clarify request sequences

pub mod config;
pub mod countdown;
pub mod sequence;
pub mod session;

pub use config::Config;
pub use countdown::Countdown;
pub use session::{RevealStage, VibeSession};
