use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's email address.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Mints and validates HS256 bearer tokens with a symmetric secret.
///
/// Keys are derived once from the configured secret; every token expires
/// `expiration_ms` after it is issued.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_ms: u64,
}

impl TokenService {
    pub fn new(secret: &str, expiration_ms: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_ms,
        }
    }

    /// Token lifetime in milliseconds, as reported in `expiresIn`.
    pub fn expiration_ms(&self) -> u64 {
        self.expiration_ms
    }

    /// Generates a signed token whose subject is `email`.
    ///
    /// # Returns
    /// Returns `AppError::InternalServerError` if encoding fails.
    pub fn issue(&self, email: &str) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiration = i64::try_from(self.expiration_ms)
            .ok()
            .and_then(chrono::Duration::try_milliseconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: email.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature and expiry and returns the decoded claims.
    ///
    /// Any failure (malformed, bad signature, expired) yields the same
    /// `AppError::Unauthorized`, so callers learn nothing about why validation failed.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &validation(true))?;
        Ok(data.claims)
    }

    /// Verifies `token` and returns the email it was issued for.
    pub fn email_from_token(&self, token: &str) -> Result<String, AppError> {
        self.verify(token).map(|claims| claims.sub)
    }

    /// Returns `true` when the token's `exp` lies in the past. A token that
    /// cannot be decoded with this secret is treated as expired.
    pub fn is_expired(&self, token: &str) -> bool {
        match decode::<Claims>(token, &self.decoding_key, &validation(false)) {
            Ok(data) => i64::try_from(data.claims.exp)
                .map_or(false, |exp| exp < chrono::Utc::now().timestamp()),
            Err(_) => true,
        }
    }
}

/// HS256 validation with no clock leeway, so `verify` and `is_expired`
/// agree on the exact second a token dies.
fn validation(check_exp: bool) -> Validation {
    let mut validation = Validation::default();
    validation.leeway = 0;
    validation.validate_exp = check_exp;
    validation
}
