//! Password hashing and verification
//!
//! Argon2id with a per-call random salt: hashing the same plaintext
//! twice yields two different strings, and brute-forcing pays the full
//! work factor per hash. Plaintext passwords exist only on the stack of
//! these functions and the handlers that receive them; they are never
//! persisted or logged.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A well-formed hash of no known password. Verified against when a
/// login names an unknown email, so that path costs the same as a wrong
/// password and the two cannot be told apart by timing.
pub(crate) const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$VE0e3g7DalWHgDwou3nuRA$uC6TER156UQpk0lNp5r2ts3h1e44WBanX0bQnVjSFs8";

/// Hash a plaintext password for storage
pub fn hash_password(plaintext: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(plaintext.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored hash
///
/// Returns false for a malformed hash rather than erroring; the caller
/// treats every failure the same way. The underlying verifier compares
/// in constant time.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// Check a candidate password against the minimum-strength policy
pub fn validate_password_strength(plaintext: &str) -> Result<(), &'static str> {
    if plaintext.is_empty() {
        return Err("password must not be empty");
    }
    if plaintext.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("password must be at least 6 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("secret123").unwrap();
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
    }

    #[test]
    fn same_plaintext_hashes_differently() {
        let first = hash_password("secret123").unwrap();
        let second = hash_password("secret123").unwrap();

        // Salted: the strings differ but both verify
        assert_ne!(first, second);
        assert!(verify_password("secret123", &first));
        assert!(verify_password("secret123", &second));
    }

    #[test]
    fn malformed_hash_verifies_false_without_panicking() {
        assert!(!verify_password("secret123", ""));
        assert!(!verify_password("secret123", "not-a-hash"));
        assert!(!verify_password("secret123", "$argon2id$garbage"));
    }

    #[test]
    fn dummy_hash_is_well_formed_and_matches_nothing() {
        assert!(PasswordHash::new(DUMMY_PASSWORD_HASH).is_ok());
        assert!(!verify_password("secret123", DUMMY_PASSWORD_HASH));
    }

    #[test]
    fn strength_policy_rejects_empty_and_short() {
        assert!(validate_password_strength("").is_err());
        assert!(validate_password_strength("12345").is_err());
        assert!(validate_password_strength("123456").is_ok());
        assert!(validate_password_strength("correct horse battery").is_ok());
    }
}
