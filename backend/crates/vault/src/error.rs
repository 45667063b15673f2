//! Vault Error Types
//!
//! This module provides vault-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Surfacing policy: validation, not-found, and rate-limit conditions are
//! expected outcomes and carry their message to the caller verbatim.
//! Everything else is an infrastructure fault: logged with full detail
//! server-side, surfaced only as a generic message.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::digest::{DigestError, SecretPolicyError};
use platform::rate_limit::RateLimitExceeded;
use thiserror::Error;

/// Vault-specific result type alias
pub type VaultResult<T> = Result<T, VaultError>;

/// Vault-specific error variants
#[derive(Debug, Error)]
pub enum VaultError {
    /// Malformed or oversized input, rejected before any connection is
    /// acquired
    #[error("{0}")]
    Validation(String),

    /// No record matched the request
    #[error("{0}")]
    NotFound(&'static str),

    /// Caller exhausted its window budget
    #[error("Too Many Requests")]
    RateLimited,

    /// Every configured node refused a connection
    #[error("All database connection attempts failed")]
    PoolUnavailable { tried: Vec<String> },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Not-found with the default message
    pub fn not_found() -> Self {
        VaultError::NotFound("Record not found")
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::Validation(_) => ErrorKind::BadRequest,
            VaultError::NotFound(_) => ErrorKind::NotFound,
            VaultError::RateLimited => ErrorKind::TooManyRequests,
            VaultError::PoolUnavailable { .. }
            | VaultError::Database(_)
            | VaultError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Convert to AppError
    ///
    /// Server-side detail (node hosts, driver messages) never crosses
    /// this boundary.
    pub fn to_app_error(&self) -> AppError {
        if self.kind().is_server_error() {
            AppError::new(self.kind(), "Internal Server Error")
        } else {
            AppError::new(self.kind(), self.to_string())
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            VaultError::PoolUnavailable { tried } => {
                tracing::error!(
                    tried_nodes = ?tried,
                    "All database connection attempts failed"
                );
            }
            VaultError::Database(e) => {
                tracing::error!(error = %e, "Vault database error");
            }
            VaultError::Internal(msg) => {
                tracing::error!(message = %msg, "Vault internal error");
            }
            VaultError::RateLimited => {
                tracing::debug!("Request rate limited");
            }
            _ => {
                tracing::debug!(error = %self, "Vault error");
            }
        }
    }
}

impl IntoResponse for VaultError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<RateLimitExceeded> for VaultError {
    fn from(_: RateLimitExceeded) -> Self {
        VaultError::RateLimited
    }
}

impl From<SecretPolicyError> for VaultError {
    fn from(err: SecretPolicyError) -> Self {
        VaultError::Validation(err.to_string())
    }
}

impl From<DigestError> for VaultError {
    fn from(err: DigestError) -> Self {
        VaultError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(VaultError::Validation("bad".into()).status_code(), 400);
        assert_eq!(VaultError::not_found().status_code(), 404);
        assert_eq!(VaultError::RateLimited.status_code(), 429);
        assert_eq!(
            VaultError::PoolUnavailable { tried: vec![] }.status_code(),
            500
        );
        assert_eq!(VaultError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_client_errors_surface_verbatim() {
        let err = VaultError::Validation("Title must be less than 256 characters long".into());
        assert_eq!(
            err.to_app_error().message(),
            "Title must be less than 256 characters long"
        );

        let err = VaultError::NotFound("No matching data found");
        assert_eq!(err.to_app_error().message(), "No matching data found");
    }

    #[test]
    fn test_server_errors_surface_generically() {
        let err = VaultError::PoolUnavailable {
            tried: vec!["db_node1".into(), "db_node2".into()],
        };
        let app = err.to_app_error();
        assert_eq!(app.message(), "Internal Server Error");
        assert!(!app.message().contains("db_node1"));

        let err = VaultError::Internal("secret topology detail".into());
        assert_eq!(err.to_app_error().message(), "Internal Server Error");
    }

    #[test]
    fn test_rate_limit_conversion() {
        let err: VaultError = RateLimitExceeded.into();
        assert!(matches!(err, VaultError::RateLimited));
    }

    #[test]
    fn test_secret_policy_conversion() {
        let err: VaultError = SecretPolicyError::Empty.into();
        assert!(matches!(err, VaultError::Validation(_)));
        assert_eq!(err.status_code(), 400);
    }
}
