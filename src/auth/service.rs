use std::sync::Arc;

use super::{AuthResponse, LoginRequest, PasswordHasher, RegisterRequest, TokenService};
use crate::error::AppError;
use crate::models::NewUser;
use crate::repository::UserRepository;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration and login.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
    passwords: PasswordHasher,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            passwords: PasswordHasher::new(bcrypt_cost),
        }
    }

    /// Creates an account and signs the new user in.
    ///
    /// A concurrent registration that slips past the email check is rejected
    /// by the unique index on `users.email`, also as `Conflict`.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        if self.users.exists_by_email(&request.email).await? {
            return Err(AppError::Conflict(format!(
                "Email already in use: {}",
                request.email
            )));
        }

        let password_hash = self.passwords.hash(request.password).await?;

        let user = self
            .users
            .create(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
            })
            .await?;
        log::info!("Registered user {} ({})", user.id, user.email);

        let token = self.tokens.issue(&user.email)?;
        Ok(AuthResponse::bearer(
            user.name,
            token,
            self.tokens.expiration_ms(),
        ))
    }

    /// Checks credentials and issues a fresh token.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        let user = match self.users.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                log::info!("Login attempt for unknown email {}", request.email);
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
            }
        };

        let matches = self
            .passwords
            .verify(request.password, user.password_hash.clone())
            .await?;

        if !matches {
            log::info!("Failed login for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let token = self.tokens.issue(&user.email)?;
        Ok(AuthResponse::bearer(
            user.name,
            token,
            self.tokens.expiration_ms(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryRepository::new()),
            TokenService::new("auth-service-secret", 60_000),
            4,
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "Password123!".to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_register_then_login() {
        let auth = service();
        let registered = auth.register(register_request("a@x.com")).await.unwrap();
        assert_eq!(registered.name, "Ada");
        assert_eq!(registered.token_type, "Bearer");
        assert_eq!(registered.expires_in, 60_000);

        let logged_in = auth
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "Password123!".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            auth.tokens.email_from_token(&logged_in.access_token).unwrap(),
            "a@x.com"
        );
    }

    #[actix_rt::test]
    async fn test_duplicate_email_is_rejected() {
        let auth = service();
        auth.register(register_request("a@x.com")).await.unwrap();
        let err = auth
            .register(register_request("a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_rt::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let auth = service();
        auth.register(register_request("a@x.com")).await.unwrap();

        let wrong_password = auth
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "WrongPassword".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_user = auth
            .login(LoginRequest {
                email: "nobody@x.com".to_string(),
                password: "Password123!".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(unknown_user, AppError::Unauthorized(_)));
    }
}
