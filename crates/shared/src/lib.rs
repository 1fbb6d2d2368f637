//! Shared infrastructure for the keeper workspace
//!
//! Database pool construction and embedded migrations, used by the API
//! server at startup.

pub mod db;

pub use db::{create_pool, run_migrations};
