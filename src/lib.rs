//! vibes - a daily fortune in the terminal
//!
//! This library provides the TUI and CLI clients for the vibes API, the
//! session model they share, and the axum server that hands out fortunes.

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod server;
pub mod tui;

pub use error::{Result, VibesError};
