//! Password hashing using Argon2id
//!
//! Hashes are stored in PHC string format, which carries the salt and
//! parameters alongside the digest.

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use lazy_static::lazy_static;

use crate::error::{Error, Result};

lazy_static! {
    /// Argon2id hash of a random secret nobody knows. Checked against when a
    /// username is unknown, so both login failures cost one verify.
    static ref DUMMY_HASH: String = {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        hash_password(&URL_SAFE_NO_PAD.encode(secret)).unwrap_or_default()
    };
}

/// Hash a password using Argon2id
///
/// # Arguments
/// * `password` - The plaintext password to hash
///
/// # Returns
/// * `Ok(String)` - The hashed password in PHC string format
/// * `Err(Error::Internal)` - If the salt or hash could not be produced
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored hash
///
/// Returns `false` if the password doesn't match or the stored hash
/// can't be parsed.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Stored hash for a credential lookup, or the dummy hash when the user is unknown
pub fn stored_or_dummy_hash(stored: Option<&str>) -> String {
    match stored {
        Some(hash) => hash.to_string(),
        None => DUMMY_HASH.clone(),
    }
}
