//! Session token signing and verification
//!
//! Tokens are compact JWTs (HS256) carrying the user id and an intent
//! string. They deliberately have no expiry claim: a token stays valid
//! until it is removed from the user's session store, and verification
//! disables expiry checking instead of omitting it by accident. The
//! signing secret is loaded once at startup and never rotated during a
//! run.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Intent embedded in session tokens. The only intent issued today;
/// the field exists so future token kinds can be told apart.
pub const AUTH_INTENT: &str = "auth";

/// Signed token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User the token was issued to
    pub sub: Uuid,
    /// Purpose of the token, `"auth"` for login sessions
    pub intent: String,
}

/// Issues and verifies session tokens with the process-wide secret
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtManager {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens carry no exp claim; revocation happens via the session
        // store, not the clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token binding `user_id` to `intent`
    pub fn issue(
        &self,
        user_id: Uuid,
        intent: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id,
            intent: intent.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Verify a token's signature and decode its payload
    ///
    /// Any structural or signature problem is an error; there is no
    /// partial acceptance.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
