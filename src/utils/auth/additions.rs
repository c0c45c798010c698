use anyhow::anyhow;
use argon2::password_hash::SaltString;
use argon2::{password_hash, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use validator::{Validate, ValidationError, ValidationErrors};

use super::models::ValidatedUserData;

/// Argon2id PHC string with a fresh salt.
pub fn hash_pass(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!(e).context("failed to hash password"))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a mismatch; a malformed stored hash is an error.
pub fn verify_pass(password: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| anyhow!(e).context("stored hash invalid"))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!(e).context("failed to verify password")),
    }
}

pub fn pass_is_strong(user_password: &str, user_inputs: &[&str]) -> bool {
    let score = zxcvbn::zxcvbn(user_password, user_inputs);
    score.map_or(false, |entropy| entropy.score() >= 3)
}

pub fn validate_user_data(username: &str, email: &str) -> Result<(), ValidationErrors> {
    ValidatedUserData {
        username: username.to_string(),
        email: email.to_string(),
    }
    .validate()
}

pub fn is_ascii_or_latin_extended(text: &str) -> Result<(), ValidationError> {
    if text.chars().all(|x| x as u32 <= 687) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "Non-ASCII and non-latin-extended characters detected",
        ))
    }
}

#[cfg(test)]
mod additions_tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_pass("#very#_#strong#_#pass#").unwrap();
        assert!(verify_pass("#very#_#strong#_#pass#", &hash).unwrap());
        assert!(!verify_pass("another password", &hash).unwrap());
        assert!(verify_pass("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn weak_password_is_rejected() {
        assert!(!pass_is_strong("12345678", &["alice"]));
        assert!(pass_is_strong("#very#_#strong#_#pass#", &["alice"]));
    }

    #[test]
    fn user_data_validation() {
        assert!(validate_user_data("alice", "alice@example.com").is_ok());
        assert!(validate_user_data("al", "alice@example.com").is_err());
        assert!(validate_user_data("alice", "not-an-email").is_err());
    }
}
