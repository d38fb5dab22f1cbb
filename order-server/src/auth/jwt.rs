//! JWT token service
//!
//! Tokens are issued by an external identity provider; this service validates
//! them. `generate_token` exists for tests and operator tooling.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 secret (at least 32 bytes outside development)
    pub secret: String,
    /// Lifetime of generated tokens (minutes)
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (numeric string)
    pub sub: String,
    pub username: String,
    /// Elevated users see every order and manage the catalog
    #[serde(default)]
    pub is_superuser: bool,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Malformed claims: {0}")]
    MalformedClaims(String),
}

/// Random printable secret for development runs without `JWT_SECRET`
pub fn generate_printable_secret() -> Option<String> {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_=+.";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    rng.fill(&mut bytes).ok()?;
    Some(
        bytes
            .iter()
            .map(|b| ALLOWED[*b as usize % ALLOWED.len()] as char)
            .collect(),
    )
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        is_superuser: bool,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            is_superuser,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Authenticated caller, injected by the auth middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub is_superuser: bool,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::MalformedClaims(format!("non-numeric sub: {}", claims.sub)))?;
        Ok(Self {
            id,
            username: claims.username,
            is_superuser: claims.is_superuser,
        })
    }
}

impl CurrentUser {
    /// Superusers see everything, others only what they own
    pub fn can_view(&self, owner_id: i64) -> bool {
        self.is_superuser || self.id == owner_id
    }
}
