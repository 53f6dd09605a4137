//! CLI module for vibes
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod commands;
pub mod config;
pub mod serve;
pub mod vibe;

pub use commands::{Cli, Commands};
