//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{Environment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, apply environment overrides, and validate.
///
/// Without a path the built-in defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            parse_config(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document into a config without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Apply process-level overrides.
///
/// Service URL variables are not handled here; the route table reads them
/// directly so they win over every other source.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(environment) = env("GATEWAY_ENV").as_deref().and_then(Environment::parse) {
        config.environment = environment;
    } else if env("RAILWAY_ENVIRONMENT")
        .is_some_and(|v| matches!(v.trim(), "true" | "production"))
    {
        config.environment = Environment::Deployed;
    }

    if let Some(port) = env("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }

    if let Some(origins) = env("CORS_ALLOWED_ORIGINS") {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }
}
