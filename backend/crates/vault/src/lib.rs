//! Vault (Sensitive Data) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository trait
//! - `application/` - The credential-store operations
//! - `infra/` - Multi-node pool router and PostgreSQL repository
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - CRUD over salted secret digests (plaintext never stored or returned)
//! - Blind matching: a plaintext candidate in, matching titles out, no
//!   record-id probing possible
//! - Hash-and-probe routing across independent database nodes with
//!   failover on node unavailability
//! - Per-endpoint fixed-window rate limiting keyed by client address
//!
//! ## Security Model
//! - Secrets digested with Argon2id at fixed cost parameters
//! - Digests never cross the read path
//! - Node topology and internal failures never surface in responses

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::store::SensitiveStore;
pub use config::{DbConfig, RateSettings};
pub use error::{VaultError, VaultResult};
pub use infra::pool::PoolRouter;
pub use infra::postgres::PgSensitiveRepository;
pub use presentation::router::vault_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
