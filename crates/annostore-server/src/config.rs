//! Server configuration from environment variables.

use std::env;

use annostore_core::userid::WORLD_GROUP;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Public base URL of this API, used for descriptor and `links`.
    pub public_url: String,
    /// Base URL of the HTML frontend serving annotation pages.
    pub html_url: String,
    /// Base URL of the in-context redirect service, if deployed.
    pub incontext_url: Option<String>,
    /// Ed25519 public key (PEM) for validating JWT Bearer tokens.
    pub jwt_public_key: String,
    /// Accept the `X-Annotator-Auth-Token` header as a userid (dev only).
    pub allow_dev_identity: bool,
    /// Default group for annotations created without one.
    pub default_group: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 3000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `PUBLIC_URL`: API base URL (default: "http://localhost:3000")
    /// - `HTML_URL`: Frontend base URL (default: `PUBLIC_URL`)
    /// - `INCONTEXT_URL`: In-context link service base URL (default: unset)
    /// - `JWT_PUBLIC_KEY`: Ed25519 PEM for token validation
    /// - `ALLOW_DEV_IDENTITY`: Accept the dev auth header (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cors_allowed_origins =
            env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string());

        let public_url = env::var("PUBLIC_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let html_url = env::var("HTML_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| public_url.clone());

        let incontext_url = env::var("INCONTEXT_URL")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string());

        let jwt_public_key = env::var("JWT_PUBLIC_KEY").unwrap_or_default();

        let allow_dev_identity = env::var("ALLOW_DEV_IDENTITY")
            .map(|s| s == "1" || s.to_lowercase() == "true")
            .unwrap_or(false);

        if jwt_public_key.is_empty() && !allow_dev_identity {
            return Err(ConfigError::InvalidValue {
                name: "JWT_PUBLIC_KEY".to_string(),
                reason: "no JWT key configured and dev identity disabled; \
                         the create endpoint would be unreachable"
                    .to_string(),
            });
        }

        Ok(Self {
            port,
            log_level,
            cors_allowed_origins,
            public_url,
            html_url,
            incontext_url,
            jwt_public_key,
            allow_dev_identity,
            default_group: WORLD_GROUP.to_string(),
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
        port: 3000,
        log_level: "info".into(),
        cors_allowed_origins: "*".into(),
        public_url: "http://api.example.com".into(),
        html_url: "http://example.com".into(),
        incontext_url: Some("http://in.example.com".into()),
        jwt_public_key: String::new(),
        allow_dev_identity: true,
        default_group: WORLD_GROUP.into(),
    }
}
