//! CLI command definitions using clap
//!
//! Defines the command structure for the `vibes` CLI tool.

use clap::{Parser, Subcommand, ValueEnum};

/// vibes - a terminal oracle
///
/// Reveal a fortune, ask for clarity, and wait a day for the next one.
/// Run without arguments to launch the TUI mode.
#[derive(Parser, Debug)]
#[command(name = "vibes", version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the vibes API (overrides the config file)
    #[arg(long, global = true, env = "VIBES_API_URL")]
    pub api_url: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current vibe session
    Show,

    /// Reveal today's fortune
    Reveal,

    /// Ask the oracle about your fortune
    Ask(AskArgs),

    /// Run the vibes API server
    Serve(ServeArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for `vibes ask`
#[derive(Parser, Debug)]
pub struct AskArgs {
    /// The question (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

impl AskArgs {
    pub fn text(&self) -> String {
        self.question.join(" ")
    }
}

/// Arguments for `vibes serve`
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind, e.g. 0.0.0.0:5000
    #[arg(long)]
    pub bind: Option<String>,

    /// Answer with canned text instead of calling OpenAI
    #[arg(long)]
    pub canned: bool,

    /// Treat every caller as the same user
    #[arg(long)]
    pub single_user: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Set a configuration value
    Set {
        /// Configuration key
        key: ConfigKey,
        /// Value to set
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: ConfigKey,
    },
    /// Reset a configuration value to its default
    Remove {
        /// Configuration key
        key: ConfigKey,
    },
    /// Print the configuration file path
    Path,
}

/// Configuration keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Base URL of the vibes API
    ApiUrl,
    /// Request timeout in seconds
    Timeout,
    /// Bind address for `vibes serve`
    Bind,
    /// Chat model used by the server's oracle
    OracleModel,
}
