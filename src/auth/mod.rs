pub mod extractors;
pub mod gate;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::NOT_BLANK;

// Re-export necessary items
pub use extractors::CurrentUser;
pub use gate::AuthGate;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use service::AuthService;
pub use token::{Claims, TokenService};

/// Represents the payload for a user login request.
///
/// Absent fields deserialize as empty strings so they fail validation
/// field by field instead of rejecting the whole body.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    /// User's password.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    /// Display name, returned on login.
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        regex(path = "NOT_BLANK", message = "Name is required")
    )]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Response after a successful registration or login.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The user's display name.
    pub name: String,
    /// Signed bearer token; its subject is the user's email.
    pub access_token: String,
    /// Always `"Bearer"`.
    #[serde(rename = "type")]
    pub token_type: String,
    /// Token lifetime in milliseconds.
    pub expires_in: u64,
}

impl AuthResponse {
    pub fn bearer(name: String, access_token: String, expires_in: u64) -> Self {
        Self {
            name,
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
