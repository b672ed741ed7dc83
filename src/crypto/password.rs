//! Password hashing using Argon2id
//!
//! Member passwords are stored as PHC strings, which carry their own salt and
//! parameters, so verification needs nothing but the stored hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{PayupError, PayupResult};

use super::secret::SecretString;

/// Hash a password into a PHC string
pub fn hash_password(password: &SecretString) -> PayupResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.expose().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PayupError::Credential(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored PHC string
///
/// A malformed stored hash is an error; a wrong password is `Ok(false)`.
pub fn verify_password(password: &SecretString, stored_hash: &str) -> PayupResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| PayupError::Credential(format!("Stored password hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.expose().as_bytes(), &parsed)
        .is_ok())
}
