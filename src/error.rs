//! Custom error types for vibes
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

/// Main error type for the vibes application
#[derive(Error, Debug)]
pub enum VibesError {
    /// The vibes API answered with a non-success status
    #[error("The oracle at {endpoint} answered with {status}: {body}\n\n  → Check that the server is running with 'vibes serve'.")]
    Api {
        /// Endpoint path, e.g. `/api/get_fortune`
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },

    /// Configured API URL cannot be parsed
    #[error("Invalid API URL: {0}\n\n  → Expected format: http://host:port\n  → Run 'vibes config set api-url http://127.0.0.1:5000' to fix it.")]
    InvalidUrl(String),

    /// Oracle (text generation) failure on the server side
    #[error("The oracle is silent: {0}\n\n  → Check OPENAI_API_KEY, or run 'vibes serve --canned'.")]
    Oracle(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your connection and the configured API URL ('vibes config get api-url').")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Terminal/TUI error
    #[error("Terminal error: {0}\n\n  → Try resizing your terminal or restarting it.")]
    Terminal(String),

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),
}

impl From<toml::de::Error> for VibesError {
    fn from(err: toml::de::Error) -> Self {
        VibesError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for VibesError {
    fn from(err: toml::ser::Error) -> Self {
        VibesError::Toml(err.to_string())
    }
}

impl From<url::ParseError> for VibesError {
    fn from(err: url::ParseError) -> Self {
        VibesError::InvalidUrl(err.to_string())
    }
}

/// Result type alias using VibesError
pub type Result<T> = std::result::Result<T, VibesError>;
