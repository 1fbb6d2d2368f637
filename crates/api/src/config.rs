//! Server configuration
//!
//! Loaded from the environment exactly once at startup and passed
//! explicitly into the components that need it. Nothing in the request
//! path reads environment variables.

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Secret for signing session tokens. Read-only after startup; a
    /// restart is the only way to rotate it.
    pub jwt_secret: String,
    /// Address the HTTP listener binds to
    pub bind_address: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            bind_address,
        })
    }
}
