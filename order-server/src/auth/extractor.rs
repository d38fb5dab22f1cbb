//! CurrentUser extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use crate::auth::{CurrentUser, JwtService};
use crate::security_log;
use crate::state::AppState;

/// Reuses the user inserted by `require_auth`, or validates the bearer token
/// itself when the route is not behind the middleware
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                return Err(AppError::unauthorized());
            }
        };

        let user = super::middleware::authenticate(&state.jwt, token, &format!("{:?}", parts.uri))?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
