//! Application state

use sqlx::PgPool;

use crate::{
    auth::{AuthState, IdentityService, JwtManager},
    config::Config,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub jwt_manager: JwtManager,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        // Signing secret is read once here; nothing re-reads it later
        let jwt_manager = JwtManager::new(&config.jwt_secret);

        Self {
            pool,
            config,
            jwt_manager,
        }
    }

    /// Get the identity service with its dependencies wired in
    pub fn identity(&self) -> IdentityService {
        IdentityService::new(self.pool.clone(), self.jwt_manager.clone())
    }

    /// Get auth state for middleware
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            identity: self.identity(),
        }
    }
}
