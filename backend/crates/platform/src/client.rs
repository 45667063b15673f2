//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Fallback key when no client address is determinable
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the client key used for pool routing and rate limiting
///
/// Checks the `X-Forwarded-For` header first (reverse proxy setups, first
/// address in the list), then `X-Real-IP`, then the direct connection
/// address. Falls back to [`UNKNOWN_CLIENT`] so every request always has a
/// key; clients behind a misconfigured proxy share one budget.
pub fn client_key(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> String {
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = xff.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    direct_ip
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
