use tracing::warn;

use crate::error::AppError;

/// Salted one-way hashing with bcrypt.
///
/// Both operations are CPU-bound and run on tokio's blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))
    }

    /// A hash that cannot be parsed never matches.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(e) => {
                warn!("Stored password hash could not be verified: {}", e);
                Ok(false)
            }
        }
    }
}
