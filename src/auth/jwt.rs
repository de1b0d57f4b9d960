//! Bearer token verification
//!
//! The service never issues tokens; it only verifies bearer tokens minted by
//! the external identity provider and reads the verified claims. Claim shape
//! follows the issuer's realm-role convention (`realm_access.roles`).

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token verification configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret with the token issuer (at least 32 bytes)
    pub secret: String,
    /// Expected token issuer
    pub issuer: String,
    /// Expected token audience
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= 32 => secret,
            Ok(_) => {
                tracing::error!("JWT_SECRET must be at least 32 characters long");
                dev_fallback_secret()
            }
            Err(_) => dev_fallback_secret(),
        };

        Self {
            secret,
            issuer: std::env::var("JWT_ISSUER")
                .unwrap_or_else(|_| "http://localhost:9090/realms/mini-project".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "account".to_string()),
        }
    }
}

fn dev_fallback_secret() -> String {
    #[cfg(debug_assertions)]
    {
        tracing::warn!("JWT_SECRET not set, using development fallback key");
        "order-server-development-secret-key-0000".to_string()
    }
    #[cfg(not(debug_assertions))]
    {
        panic!("JWT_SECRET environment variable must be set in production");
    }
}

/// Realm-role claim block as emitted by the identity provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Verified JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Stable user identifier (subject)
    pub sub: String,
    /// Username claim, used as the order owner identity
    #[serde(default)]
    pub preferred_username: String,
    /// Role names granted by the issuer
    #[serde(default)]
    pub realm_access: RealmAccess,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// Token verification errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// Bearer token verifier
///
/// Holds the decoding key for the issuer's signing secret. The encoding half
/// exists so tests can mint tokens without standing up the issuer.
#[derive(Debug, Clone)]
pub struct JwtVerifier {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Verify and decode a bearer token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Mint a signed token with the configured secret
    ///
    /// Not used on any request path; tokens come from the external issuer.
    pub fn generate_token(
        &self,
        user_id: &str,
        username: &str,
        roles: &[&str],
        ttl_seconds: i64,
    ) -> Result<String, JwtError> {
        let now = chrono::Utc::now().timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            preferred_username: username.to_string(),
            realm_access: RealmAccess {
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
            exp: now + ttl_seconds,
            iat: now,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Verified principal (from JWT claims)
///
/// Created by the auth middleware and injected into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Stable user id (subject claim)
    pub id: String,
    /// Username, used as order owner
    pub username: String,
    /// Role names granted by the issuer
    pub roles: Vec<String>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        // The original deployment keys orders by the username claim; fall
        // back to the subject when the issuer omits it.
        let username = if claims.preferred_username.is_empty() {
            claims.sub.clone()
        } else {
            claims.preferred_username
        };

        Self {
            id: claims.sub,
            username,
            roles: claims.realm_access.roles,
        }
    }
}

impl CurrentUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }
}
