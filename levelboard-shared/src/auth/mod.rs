/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength checks
/// - [`jwt`]: JWT access/refresh token generation and validation
/// - [`middleware`]: Bearer token resolution into an `AuthContext`
/// - [`authorization`]: Admin and self-or-admin checks
///
/// # Example
///
/// ```no_run
/// use levelboard_shared::auth::password::{hash_password, verify_password};
/// use levelboard_shared::auth::jwt::{create_token, Claims, TokenType};
/// use levelboard_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("marathon42")?;
/// assert!(verify_password("marathon42", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), UserRole::User, TokenType::Access);
/// let token = create_token(&claims, "a-secret-of-at-least-thirty-two-bytes")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
