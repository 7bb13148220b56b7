use crate::error::AppError;

/// bcrypt hashing with the configured work factor.
///
/// Both operations run on the blocking thread pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: String) -> Result<String, AppError> {
        let cost = self.cost;
        run_blocking(move || bcrypt::hash(password, cost)).await
    }

    /// A stored hash bcrypt cannot parse is an error, not a mismatch.
    pub async fn verify(&self, password: String, hash: String) -> Result<bool, AppError> {
        run_blocking(move || bcrypt::verify(password, &hash)).await
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password task failed: {}", e)))?
        .map_err(AppError::from)
}
