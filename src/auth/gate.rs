use std::sync::Arc;

use super::Claims;
use crate::error::AppError;
use crate::models::User;
use crate::repository::UserRepository;

/// Resolves the authenticated principal of a request into a stored `User`.
///
/// Services never look up the caller themselves; handlers obtain the user
/// here (through the `CurrentUser` extractor) and pass it in explicitly.
#[derive(Clone)]
pub struct AuthGate {
    users: Arc<dyn UserRepository>,
}

impl AuthGate {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Fails closed: no claims means `Unauthorized`; claims for an email with
    /// no matching user is a data-integrity fault reported as `NotFound`.
    pub async fn current_user(&self, principal: Option<&Claims>) -> Result<User, AppError> {
        let claims =
            principal.ok_or_else(|| AppError::Unauthorized("User not authenticated".into()))?;

        self.users
            .find_by_email(&claims.sub)
            .await?
            .ok_or_else(|| {
                log::warn!("Valid token for unknown user {}", claims.sub);
                AppError::NotFound(format!("User not found with email: {}", claims.sub))
            })
    }
}
