// Test code patterns:
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! keeper API library
//!
//! Authentication core (argon2 password storage, signed session tokens
//! revocable through a per-user session store) and owner-scoped record
//! routes on top of it.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
