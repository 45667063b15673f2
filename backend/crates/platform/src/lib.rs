//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Secret digesting (Argon2id with fixed cost parameters)
//! - Fixed-window rate limiting
//! - Client identification from HTTP headers

pub mod client;
pub mod digest;
pub mod rate_limit;
