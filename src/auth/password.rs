use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{AppError, AppResult};

/// Prefix marking a password that can never match, as set for accounts
/// created without one.
const UNUSABLE_PREFIX: char = '!';

pub fn hash_password(password: &str) -> AppResult<String> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

pub fn unusable_password() -> String {
    format!("{UNUSABLE_PREFIX}{}", uuid::Uuid::new_v4().to_simple())
}

pub fn verify_password(password: &str, hashed: &str) -> bool {
    if hashed.starts_with(UNUSABLE_PREFIX) {
        return false;
    }
    let Ok(parsed) = PasswordHash::new(hashed) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
