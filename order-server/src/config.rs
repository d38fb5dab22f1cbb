//! Server configuration

use crate::auth::JwtConfig;
use crate::auth::jwt::generate_printable_secret;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const MIN_JWT_SECRET_LEN: usize = 32;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    pub http_port: u16,
    /// PostgreSQL connection URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
}

impl Config {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Require a secret env var outside development
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                tracing::warn!("{name} not set, using a random key for this run");
                generate_printable_secret().ok_or("failed to generate development secret")?
            }
        };
        if val.len() < MIN_JWT_SECRET_LEN && environment != "development" {
            return Err(format!(
                "{name} must be at least {MIN_JWT_SECRET_LEN} characters in {environment} environment"
            )
            .into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if database_url.is_none() && environment != "development" {
            return Err(format!("DATABASE_URL must be set in {environment} environment").into());
        }

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url,
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
            jwt: JwtConfig {
                secret: Self::require_secret("JWT_SECRET", &environment)?,
                expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1440),
                issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "order-server".into()),
                audience: std::env::var("JWT_AUDIENCE")
                    .unwrap_or_else(|_| "order-clients".into()),
            },
            environment,
        })
    }
}
