//! Authentication middleware
//!
//! Axum middleware for bearer-token authentication.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{BearerToken, CurrentUser, JwtVerifier};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Authentication middleware - requires a verified bearer token
///
/// Extracts and verifies the JWT from `Authorization: Bearer <token>`. On
/// success injects [`CurrentUser`] and the raw [`BearerToken`] into request
/// extensions; the raw token is relayed unmodified on downstream product
/// lookups.
///
/// # Paths that skip authentication
///
/// - `OPTIONS *` (CORS preflight)
/// - anything outside `/api/` (health endpoint, plain 404s)
///
/// # Errors
///
/// | Failure | HTTP status |
/// |---------|-------------|
/// | missing Authorization header | 401 Unauthorized |
/// | expired token | 401 TokenExpired |
/// | invalid token | 401 InvalidToken |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // Allow CORS preflight through
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API routes (health, unknown paths) are not protected
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtVerifier::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    match state.verifier.validate_token(token) {
        Ok(claims) => {
            let bearer = BearerToken(token.to_string());
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            req.extensions_mut().insert(bearer);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}
