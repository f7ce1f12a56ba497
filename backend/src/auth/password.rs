use std::sync::OnceLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(OsRng);
    let password_hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verify a password against a stored hash.
///
/// A mismatch is `Ok(false)`; a malformed stored hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Runs one Argon2 verification that can never succeed.
///
/// Used when no account matches a login, so that path costs the same as a wrong password.
pub fn verify_dummy_password(password: &str) {
    let hash = DUMMY_HASH.get_or_init(|| hash_password("tunegate-no-such-account").ok());
    if let Some(hash) = hash {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_creates_argon2id_hash() {
        let hash = hash_password("venue_password_123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.len() > 50);
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_success() {
        let hash = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_failure() {
        let hash = hash_password("correct_password").unwrap();
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_with_invalid_hash() {
        let result = verify_password("any_password", "not_a_valid_hash");
        assert!(result.is_err());
    }

    #[test]
    fn test_hash_unicode_password() {
        let password = "🔐密码测试🔑";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_dummy_verification_uses_a_real_hash() {
        verify_dummy_password("anything");

        let hash = DUMMY_HASH.get().and_then(Option::as_deref).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!verify_password("anything", hash).unwrap());
    }
}
