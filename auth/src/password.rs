//! Password hashing and validation.

use crate::error::{AuthError, AuthResult};
use bcrypt::{DEFAULT_COST, hash, verify};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Bcrypt cost factor used when the config does not override it.
pub const BCRYPT_COST: u32 = DEFAULT_COST;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum accepted password length (bcrypt truncates at 72 bytes).
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Common passwords list (loaded once)
static COMMON_PASSWORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// Hash a password with bcrypt.
///
/// Runs on the blocking thread pool so the hash does not stall the async
/// runtime.
pub async fn hash_password(password: &str, cost: Option<u32>) -> AuthResult<String> {
    let password = password.to_string();
    let cost = cost.unwrap_or(BCRYPT_COST);

    tokio::task::spawn_blocking(move || {
        hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("task join error: {}", e)))?
}

/// Compare a plain text password against a stored bcrypt hash.
///
/// Returns `Ok(false)` on a mismatch; errors are reserved for malformed
/// hashes and runtime failures.
pub async fn verify_password(password: &str, stored_hash: &str) -> AuthResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();

    tokio::task::spawn_blocking(move || {
        verify(password, &stored_hash).map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("task join error: {}", e)))?
}

/// Validate a password before it is hashed: length bounds, and not on the
/// common-passwords list.
pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at most {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }

    if is_common_password(password) {
        return Err(AuthError::WeakPassword(
            "password is too common".to_string(),
        ));
    }

    Ok(())
}

/// Check a password against the common-passwords list, ignoring case.
fn is_common_password(password: &str) -> bool {
    let common = COMMON_PASSWORDS.get_or_init(|| {
        [
            "password", "password1", "password123", "12345678", "123456789", "1234567890",
            "qwerty123", "qwertyuiop", "iloveyou", "admin123", "welcome1", "sunshine",
            "princess", "football", "baseball", "trustno1", "passw0rd", "superman",
            "letmein1", "whatever", "starwars", "internet", "computer", "11111111",
        ]
        .into_iter()
        .collect()
    });

    common.contains(password.to_lowercase().as_str())
}
