//! Cross-origin policy for the browser frontend.

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::{CorsConfig, Environment};

/// Origins allowed when nothing is configured for a local run.
const LOCAL_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://frontend:3000",
];

/// Effective allow-list for the environment.
pub fn allowed_origins(config: &CorsConfig, environment: Environment) -> Vec<String> {
    if !config.allowed_origins.is_empty() {
        return config.allowed_origins.clone();
    }
    match environment {
        Environment::Local => LOCAL_ORIGINS.iter().map(|o| o.to_string()).collect(),
        Environment::Deployed => Vec::new(),
    }
}

/// Build the CORS layer.
///
/// Credentials are allowed for explicit origins so the frontend can send
/// cookies; a `*` entry opens every origin and disables credentials.
pub fn cors_layer(config: &CorsConfig, environment: Environment) -> CorsLayer {
    let origins = allowed_origins(config, environment);

    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods(AllowMethods::any())
            .allow_headers(AllowHeaders::any());
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if values.is_empty() {
        tracing::warn!(environment = ?environment, "No CORS origins configured; cross-origin requests will be rejected");
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(values))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_defaults_to_frontend_origins() {
        let origins = allowed_origins(&CorsConfig::default(), Environment::Local);
        assert_eq!(origins.len(), 3);
        assert!(origins.contains(&"http://localhost:3000".to_string()));
    }

    #[test]
    fn deployed_has_no_implicit_origins() {
        assert!(allowed_origins(&CorsConfig::default(), Environment::Deployed).is_empty());
    }

    #[test]
    fn configured_list_wins() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.example.com".into()],
        };
        assert_eq!(
            allowed_origins(&config, Environment::Local),
            vec!["https://app.example.com"]
        );
    }
}
