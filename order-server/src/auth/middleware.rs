//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::security_log;
use crate::state::AppState;

/// Require a valid bearer token on every `/api/` route
///
/// Validates `Authorization: Bearer <token>` and inserts [`CurrentUser`] into
/// the request extensions.
///
/// | Failure | Status |
/// |---------|--------|
/// | No Authorization header | 401 NotAuthenticated |
/// | Expired token | 401 TokenExpired |
/// | Invalid token or claims | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS preflight
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API routes (health, unknown paths) stay public
    if !req.uri().path().starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    let user = authenticate(&state.jwt, token, &format!("{:?}", req.uri()))?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Require a superuser; must run after [`require_auth`]
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_superuser {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id,
            username = user.username.clone(),
            uri = format!("{:?}", req.uri())
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}

/// Validate a token and turn its claims into a [`CurrentUser`]
pub(crate) fn authenticate(
    jwt: &JwtService,
    token: &str,
    uri: &str,
) -> Result<CurrentUser, AppError> {
    let result = jwt.validate_token(token).and_then(CurrentUser::try_from);
    result.map_err(|e| {
        security_log!(
            "WARN",
            "auth_failed",
            error = format!("{}", e),
            uri = uri.to_string()
        );
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            JwtError::MalformedClaims(msg) => {
                AppError::invalid_token(format!("Malformed JWT claims: {msg}"))
            }
            _ => AppError::invalid_token("Invalid token"),
        }
    })
}
