pub mod extractors;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// Re-export necessary items
pub use extractors::AuthenticatedUserId;
pub use guard::{authorize, AuthRejection, GuardOutcome};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password, MAX_PASSWORD_BYTES};
pub use token::{Claims, TokenService};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    pub(crate) static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// bcrypt only reads the first 72 bytes, so longer passwords are refused outright.
fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut err = ValidationError::new("password_too_long");
        err.message = Some("Password must be at most 72 bytes".into());
        return Err(err);
    }
    Ok(())
}

/// Emails are compared case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email)]
    pub email: String,
    /// User's password. Only presence is checked here; the hash decides the rest.
    #[validate(length(min = 1), custom = "validate_password_bytes")]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username for the new account.
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Email address for the new account.
    #[validate(email)]
    pub email: String,
    /// Password for the new account.
    /// At least 6 characters and at most 72 bytes.
    #[validate(length(min = 6), custom = "validate_password_bytes")]
    pub password: String,
}

/// Response after a successful registration. Never carries the password or its hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub username: String,
}

/// Response after a successful login.
/// Contains the JWT access token and the ID of the authenticated user.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The JWT (JSON Web Token) for session authentication.
    pub token: String,
    /// The unique identifier of the authenticated user.
    pub user_id: i64,
}
