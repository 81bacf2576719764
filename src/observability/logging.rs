//! Structured logging.
//!
//! `RUST_LOG` takes precedence over the configured level so operators can
//! raise verbosity without editing the config file.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Default directive when nothing else is configured.
fn default_directive(level: &str) -> String {
    format!("esg_gateway={level},tower_http={level}")
}

/// Install the global subscriber.
///
/// Returns an error when a subscriber is already installed.
pub fn init_logging(
    config: &ObservabilityConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_scopes_crate_and_http_layer() {
        assert_eq!(default_directive("debug"), "esg_gateway=debug,tower_http=debug");
    }
}
