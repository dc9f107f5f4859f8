// src/services/password.rs
use bcrypt::{hash, verify, DEFAULT_COST};

use crate::errors::{AppError, Result};

// bcrypt only reads the first 72 bytes of input; anything longer must be
// refused outright rather than silently truncated.
const MAX_PASSWORD_BYTES: usize = 72;

pub fn hash_password(plain: &str) -> Result<String> {
    if plain.is_empty() {
        return Err(AppError::validation("password", "Password must not be empty"));
    }
    if plain.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::validation(
            "password",
            "Password must be at most 72 bytes",
        ));
    }

    Ok(hash(plain, DEFAULT_COST)?)
}

/// Constant-time comparison happens inside bcrypt; a mismatch or an
/// unparseable hash both come back as `false`, never as an error.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    verify(plain, hashed).unwrap_or(false)
}
