//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use bazaar_core::config::auth::AuthConfig;
use bazaar_core::error::AppError;

/// Hashes and verifies passwords with Argon2id.
///
/// Hashing is CPU and memory heavy; the async wrappers move it onto the
/// blocking pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a random secret, verified when the account does not exist.
    dummy_hash: String,
}

impl PasswordHasher {
    /// Build a hasher with the configured cost parameters.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;

        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        let dummy_secret = SaltString::generate(&mut OsRng);
        hasher.dummy_hash = hasher.hash_password(dummy_secret.as_str())?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a random salt into a PHC string.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored PHC string.
    ///
    /// A malformed record never matches.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// [`Self::hash_password`] on the blocking pool.
    pub async fn hash(&self, password: String) -> Result<String, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))?
    }

    /// [`Self::verify_password`] on the blocking pool.
    pub async fn verify(&self, password: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Verification task failed: {e}")))
    }

    /// Spend one verification on the dummy record and report failure.
    ///
    /// Used when the account is unknown so both failure paths cost the same.
    pub async fn verify_dummy(&self, password: String) -> Result<bool, AppError> {
        self.verify(password, self.dummy_hash.clone()).await?;
        Ok(false)
    }
}
