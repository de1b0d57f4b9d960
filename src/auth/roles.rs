//! Role Definitions
//!
//! Role names as granted by the identity provider. The service enforces a
//! fixed operation -> role matrix in the order handlers; it never derives
//! roles itself.

use crate::auth::CurrentUser;
use crate::utils::AppError;

/// Elevated role: full access to every order operation
pub const ROLE_ADMIN: &str = "ADMIN";

/// Restricted role: may create orders and read orders (including the
/// my-orders view, which is exclusive to this role)
pub const ROLE_CLIENT: &str = "CLIENT";

impl CurrentUser {
    /// Reject the request unless the principal holds one of the given roles
    pub fn require_any_role(&self, roles: &[&str]) -> Result<(), AppError> {
        if self.has_any_role(roles) {
            return Ok(());
        }

        crate::security_log!(
            "WARN",
            "role_denied",
            user_id = self.id.clone(),
            username = self.username.clone(),
            required_roles = roles.join(",")
        );
        Err(AppError::forbidden(format!(
            "Requires one of roles: {}",
            roles.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_roles(roles: &[&str]) -> CurrentUser {
        CurrentUser {
            id: "u1".to_string(),
            username: "alice".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn require_any_role_accepts_matching_role() {
        let user = user_with_roles(&[ROLE_CLIENT]);
        assert!(user.require_any_role(&[ROLE_ADMIN, ROLE_CLIENT]).is_ok());
    }

    #[test]
    fn require_any_role_rejects_unrelated_roles() {
        let user = user_with_roles(&["AUDITOR"]);
        let err = user.require_any_role(&[ROLE_ADMIN, ROLE_CLIENT]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
