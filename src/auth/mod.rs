//! Authentication and authorization
//!
//! Bearer-token verification and role enforcement:
//! - [`JwtVerifier`] - token verification against the external issuer's secret
//! - [`CurrentUser`] - verified principal (id, username, roles)
//! - [`require_auth`] - authentication middleware
//! - [`BearerToken`] - raw credential, relayed downstream unmodified

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod roles;

pub use extractor::BearerToken;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtVerifier, RealmAccess};
pub use middleware::require_auth;
pub use roles::{ROLE_ADMIN, ROLE_CLIENT};
