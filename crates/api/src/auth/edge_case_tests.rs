//! Edge case tests for the authentication core
//!
//! Boundary conditions in:
//! - Token forgery and tampering (signature, payload, secret, intent)
//! - Password policy boundaries
//! - The enumeration-resistance path in login
//!
//! The identity service is built over a lazy pool here: the paths under
//! test all reject before any query runs, so no database is needed.

#[cfg(test)]
mod token_tests {
    use super::super::identity::IdentityService;
    use super::super::jwt::{JwtManager, AUTH_INTENT};
    use crate::error::ApiError;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    const TEST_SECRET: &str = "test-jwt-secret-key-for-testing-only";

    /// Identity service over a pool that never connects. Every test
    /// below must fail authentication before the first query.
    fn offline_service() -> IdentityService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/keeper_test")
            .expect("lazy pool construction does not connect");

        IdentityService::new(pool, JwtManager::new(TEST_SECRET))
    }

    // =========================================================================
    // A token signed with a different secret never authenticates
    // =========================================================================
    #[tokio::test]
    async fn test_foreign_secret_token_is_unauthenticated() {
        let service = offline_service();
        let forged = JwtManager::new("some-other-secret")
            .issue(Uuid::new_v4(), AUTH_INTENT)
            .unwrap();

        let result = service.authenticate(&forged).await;
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }

    // =========================================================================
    // One altered signature byte is enough to reject
    // =========================================================================
    #[tokio::test]
    async fn test_tampered_signature_is_unauthenticated() {
        let service = offline_service();
        let token = JwtManager::new(TEST_SECRET)
            .issue(Uuid::new_v4(), AUTH_INTENT)
            .unwrap();

        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'x' { 'y' } else { 'x' });
        assert_ne!(token, tampered);

        let result = service.authenticate(&tampered).await;
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }

    // =========================================================================
    // A valid signature with the wrong intent is rejected before any
    // user lookup
    // =========================================================================
    #[tokio::test]
    async fn test_wrong_intent_is_unauthenticated() {
        let service = offline_service();
        let token = JwtManager::new(TEST_SECRET)
            .issue(Uuid::new_v4(), "reset")
            .unwrap();

        let result = service.authenticate(&token).await;
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }

    // =========================================================================
    // Garbage is rejected the same way as a bad signature
    // =========================================================================
    #[tokio::test]
    async fn test_malformed_token_is_unauthenticated() {
        let service = offline_service();

        for garbage in ["", "x", "a.b", "a.b.c.d", "ey.ey.ey"] {
            let result = service.authenticate(garbage).await;
            assert!(
                matches!(result, Err(ApiError::Unauthenticated)),
                "expected Unauthenticated for {garbage:?}"
            );
        }
    }
}

#[cfg(test)]
mod password_tests {
    use super::super::password::{
        hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
    };

    // =========================================================================
    // Length boundary: exactly the minimum passes, one less fails
    // =========================================================================
    #[test]
    fn test_strength_boundary_at_minimum_length() {
        assert_eq!(MIN_PASSWORD_LENGTH, 6);

        let at_minimum = "a".repeat(MIN_PASSWORD_LENGTH);
        let below_minimum = "a".repeat(MIN_PASSWORD_LENGTH - 1);

        assert!(validate_password_strength(&at_minimum).is_ok());
        assert!(validate_password_strength(&below_minimum).is_err());
    }

    // =========================================================================
    // The policy counts characters, not bytes
    // =========================================================================
    #[test]
    fn test_strength_counts_characters_not_bytes() {
        // Six two-byte characters: twelve bytes, six characters
        let password = "éééééé";
        assert_eq!(password.chars().count(), 6);
        assert!(validate_password_strength(password).is_ok());
    }

    // =========================================================================
    // Hashing accepts anything that passed the policy, including
    // whitespace and unicode
    // =========================================================================
    #[test]
    fn test_hash_round_trip_with_unusual_plaintexts() {
        for plaintext in ["secret123", "pass word", "contraseña!", "  padded  "] {
            let hash = hash_password(plaintext).unwrap();
            assert!(verify_password(plaintext, &hash));
        }
    }

    // =========================================================================
    // A hash never verifies a near-miss plaintext
    // =========================================================================
    #[test]
    fn test_near_miss_plaintexts_fail() {
        let hash = hash_password("secret123").unwrap();

        assert!(!verify_password("secret123 ", &hash));
        assert!(!verify_password(" secret123", &hash));
        assert!(!verify_password("Secret123", &hash));
        assert!(!verify_password("", &hash));
    }
}
