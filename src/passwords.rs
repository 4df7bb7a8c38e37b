//! Argon2 password hashing helpers.

use argon2::{
    Argon2,
    password_hash::{Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a password with a fresh random salt.
///
/// # Errors
/// Returns any error reported by the Argon2 hasher.
pub fn hash_password(argon2: &Argon2, pw: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon2.hash_password(pw.as_bytes(), &salt)?.to_string())
}

/// Verify a password against a stored PHC hash string.
///
/// # Errors
/// Returns an error when the stored hash cannot be parsed.
pub fn verify_password(hash: &str, pw: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(pw.as_bytes(), &parsed_hash)
        .is_ok())
}
