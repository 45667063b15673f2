//! Domain Entities

use chrono::{DateTime, Utc};
use platform::digest::SecretDigest;

/// Metadata for one stored sensitive record
///
/// The only shape that crosses the read path. The digest is deliberately
/// absent; it exists only in [`DigestEntry`] during a matching pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveRecord {
    /// Server-generated, immutable
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One record's digest loaded for a blind-matching pass
#[derive(Debug)]
pub struct DigestEntry {
    pub id: i64,
    pub title: String,
    pub digest: SecretDigest,
}
