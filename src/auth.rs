//! Admin credential check and session lifecycle.
//!
//! The admin password is stored only as an Argon2 PHC hash in the
//! configuration. A successful login writes a [`SessionRecord`] to the
//! session slot so a later process can [`Authenticator::resume`] it until the
//! configured TTL runs out.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    config::AdminConfig,
    runtime::handle::{LeaderboardHandle, RuntimeError},
    types::{TimestampMs, now_ms},
};

/// Authentication failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Password did not match.
    #[error("invalid password")]
    InvalidCredentials,
    /// No password hash is configured, so nobody can log in.
    #[error("admin password hash is not configured")]
    NotConfigured,
    /// Stored hash could not be parsed, or hashing failed.
    #[error("password hash: {0}")]
    Hash(String),
    /// No live session exists.
    #[error("not logged in")]
    NoSession,
    /// Session slot could not be read or written.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Persisted marker of a logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Random session token.
    pub token: String,
    /// Login time in milliseconds.
    pub issued_at_ms: TimestampMs,
}

/// Proof of a successful admin login, required to build an admin view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    token: String,
    issued_at_ms: TimestampMs,
}

impl AdminSession {
    /// Session token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Login time in milliseconds.
    pub fn issued_at_ms(&self) -> TimestampMs {
        self.issued_at_ms
    }
}

/// Hashes `password` with Argon2id into a PHC string suitable for the
/// `admin.password_hash` config key.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Checks `password` against a PHC hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Issues, resumes and ends admin sessions.
#[derive(Clone)]
pub struct Authenticator {
    handle: LeaderboardHandle,
    config: AdminConfig,
}

impl Authenticator {
    /// Creates an authenticator over the runtime's session slot.
    pub fn new(handle: LeaderboardHandle, config: AdminConfig) -> Self {
        Self { handle, config }
    }

    /// Verifies the password and stores a fresh session.
    ///
    /// There is no lockout; every failed attempt just returns
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, password: &str) -> Result<AdminSession, AuthError> {
        let hash = self
            .config
            .password_hash
            .clone()
            .ok_or(AuthError::NotConfigured)?;
        let password = password.to_string();
        let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Hash(format!("join error: {e}")))??;
        if !ok {
            warn!("admin login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let record = SessionRecord {
            token: uuid::Uuid::new_v4().to_string(),
            issued_at_ms: now_ms(),
        };
        self.handle.save_session(record.clone()).await?;
        info!("admin session started");
        Ok(AdminSession {
            token: record.token,
            issued_at_ms: record.issued_at_ms,
        })
    }

    /// Returns the stored session if it has not expired.
    pub async fn resume(&self) -> Result<Option<AdminSession>, AuthError> {
        let Some(record) = self.handle.load_session().await? else {
            return Ok(None);
        };
        let ttl_ms = self.config.session_ttl_secs.saturating_mul(1000);
        if now_ms().saturating_sub(record.issued_at_ms) > ttl_ms {
            info!("admin session expired");
            self.handle.clear_session().await?;
            return Ok(None);
        }
        Ok(Some(AdminSession {
            token: record.token,
            issued_at_ms: record.issued_at_ms,
        }))
    }

    /// Like [`Authenticator::resume`] but fails with [`AuthError::NoSession`].
    pub async fn require(&self) -> Result<AdminSession, AuthError> {
        self.resume().await?.ok_or(AuthError::NoSession)
    }

    /// Removes the stored session.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.handle.clear_session().await?;
        info!("admin session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("hunter2").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash).expect("verify"));
        assert!(!verify_password("admin", &hash).expect("verify"));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("x", "plaintext"),
            Err(AuthError::Hash(_))
        ));
    }
}
