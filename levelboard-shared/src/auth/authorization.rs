/// Authorization checks
///
/// Two rules guard the write endpoints:
///
/// 1. **Admin only**: point adjustments, role changes, user deletion and
///    classification creation
/// 2. **Self or admin**: recording actions, submitting stats and subscribing
///    on behalf of a user
///
/// Checks run in the handler before any core operation, so a rejected request
/// never reaches the store.
///
/// # Example
///
/// ```
/// use levelboard_shared::auth::authorization::{require_admin, require_self_or_admin};
/// use levelboard_shared::auth::middleware::AuthContext;
/// use levelboard_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let me = Uuid::new_v4();
/// let auth = AuthContext::new(me, UserRole::User);
///
/// assert!(require_self_or_admin(&auth, me).is_ok());
/// assert!(require_self_or_admin(&auth, Uuid::new_v4()).is_err());
/// assert!(require_admin(&auth).is_err());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is not an admin
    #[error("Admin role required")]
    AdminRequired,

    /// Caller acts on another user's resource without being admin
    #[error("Not authorized to act for user {0}")]
    NotAuthorized(Uuid),
}

/// Requires the caller to be an admin
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if !auth.is_admin() {
        tracing::warn!(user_id = %auth.user_id, "Admin action rejected");
        return Err(AuthzError::AdminRequired);
    }

    Ok(())
}

/// Requires the caller to be `user_id` or an admin
pub fn require_self_or_admin(auth: &AuthContext, user_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id != user_id && !auth.is_admin() {
        tracing::warn!(
            user_id = %auth.user_id,
            target_user_id = %user_id,
            "Cross-user action rejected"
        );
        return Err(AuthzError::NotAuthorized(user_id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&AuthContext::new(Uuid::new_v4(), UserRole::Admin)).is_ok());
        assert!(matches!(
            require_admin(&AuthContext::new(Uuid::new_v4(), UserRole::User)),
            Err(AuthzError::AdminRequired)
        ));
    }

    #[test]
    fn test_require_self_or_admin() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        let user = AuthContext::new(me, UserRole::User);
        assert!(require_self_or_admin(&user, me).is_ok());
        assert!(matches!(
            require_self_or_admin(&user, other),
            Err(AuthzError::NotAuthorized(id)) if id == other
        ));

        let admin = AuthContext::new(me, UserRole::Admin);
        assert!(require_self_or_admin(&admin, other).is_ok());
    }

    #[test]
    fn test_authz_error_display() {
        assert_eq!(AuthzError::AdminRequired.to_string(), "Admin role required");

        let id = Uuid::nil();
        assert!(AuthzError::NotAuthorized(id).to_string().contains(&id.to_string()));
    }
}
