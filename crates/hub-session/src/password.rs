//! Password hashing and verification.
//!
//! New credentials are stored as Argon2id PHC strings. Rows written
//! before hashing was introduced hold the raw password, so verification
//! falls back to direct comparison when the stored value does not parse
//! as a PHC string.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;

/// Hash a password into an Argon2id PHC string.
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)?;

    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored credential.
///
/// Stored PHC strings are verified with Argon2; anything else is treated
/// as a legacy plaintext credential and compared directly.
pub fn verify(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => password == stored,
    }
}
