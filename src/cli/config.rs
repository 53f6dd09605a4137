//! Configuration CLI command handlers

use crate::cli::commands::{ConfigCommand, ConfigKey};
use crate::core::config::{Config, ServerConfig};
use crate::error::{Result, VibesError};

/// Handle configuration commands
pub fn handle_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Set { key, value } => {
            let mut config = Config::load()?;
            apply_set(&mut config, key, &value)?;
            config.save()?;
            println!("{} set to: {}", key_name(key), current_value(&config, key));
        }
        ConfigCommand::Get { key } => {
            let config = Config::load()?;
            println!("{}: {}", key_name(key), current_value(&config, key));
        }
        ConfigCommand::Remove { key } => {
            let mut config = Config::load()?;
            reset(&mut config, key);
            config.save()?;
            println!(
                "{} reset to default: {}",
                key_name(key),
                current_value(&config, key)
            );
        }
        ConfigCommand::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}

fn key_name(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::ApiUrl => "API URL",
        ConfigKey::Timeout => "Request timeout",
        ConfigKey::Bind => "Server bind address",
        ConfigKey::OracleModel => "Oracle model",
    }
}

/// Validate and store a value
fn apply_set(config: &mut Config, key: ConfigKey, value: &str) -> Result<()> {
    match key {
        ConfigKey::ApiUrl => config.set_api_url(value)?,
        ConfigKey::Timeout => {
            let secs: u64 = value.trim().parse().map_err(|_| {
                VibesError::InvalidInput(format!(
                    "Invalid timeout '{}'. Expected a number of seconds.",
                    value
                ))
            })?;
            if secs == 0 {
                return Err(VibesError::InvalidInput(
                    "Timeout must be at least 1 second.".to_string(),
                ));
            }
            config.request_timeout_secs = secs;
        }
        ConfigKey::Bind => {
            value
                .trim()
                .parse::<std::net::SocketAddr>()
                .map_err(|_| {
                    VibesError::InvalidInput(format!(
                        "Invalid bind address '{}'. Expected host:port, e.g. 127.0.0.1:5000",
                        value
                    ))
                })?;
            config.server.bind = value.trim().to_string();
        }
        ConfigKey::OracleModel => {
            if value.trim().is_empty() {
                return Err(VibesError::InvalidInput(
                    "Oracle model cannot be empty.".to_string(),
                ));
            }
            config.server.oracle_model = value.trim().to_string();
        }
    }
    Ok(())
}

fn reset(config: &mut Config, key: ConfigKey) {
    let defaults = Config::default();
    let server_defaults = ServerConfig::default();
    match key {
        ConfigKey::ApiUrl => config.api_url = defaults.api_url,
        ConfigKey::Timeout => config.request_timeout_secs = defaults.request_timeout_secs,
        ConfigKey::Bind => config.server.bind = server_defaults.bind,
        ConfigKey::OracleModel => config.server.oracle_model = server_defaults.oracle_model,
    }
}

fn current_value(config: &Config, key: ConfigKey) -> String {
    match key {
        ConfigKey::ApiUrl => config.api_url.clone(),
        ConfigKey::Timeout => format!("{}s", config.request_timeout_secs),
        ConfigKey::Bind => config.server.bind.clone(),
        ConfigKey::OracleModel => config.server.oracle_model.clone(),
    }
}
