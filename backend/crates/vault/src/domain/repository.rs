//! Repository Trait
//!
//! Interface for sensitive-record persistence. Implementation is in the
//! infrastructure layer. Every method takes the caller's routing key so
//! the implementation can pick a backing node with affinity to the caller.

use platform::digest::SecretDigest;

use crate::domain::entity::{DigestEntry, SensitiveRecord};
use crate::domain::value_object::RecordTitle;
use crate::error::VaultResult;

/// Sensitive-record repository trait
#[trait_variant::make(SensitiveRepository: Send)]
pub trait LocalSensitiveRepository {
    /// Insert a new record inside a transaction, returning its metadata
    async fn insert(
        &self,
        key: &str,
        title: &RecordTitle,
        digest: &SecretDigest,
    ) -> VaultResult<SensitiveRecord>;

    /// Fetch one record's metadata by id
    async fn find_by_id(&self, key: &str, id: i64) -> VaultResult<Option<SensitiveRecord>>;

    /// Fetch every record's metadata
    async fn find_all(&self, key: &str) -> VaultResult<Vec<SensitiveRecord>>;

    /// Update title and/or digest inside a transaction
    ///
    /// Returns `None` after rolling back when no row matched `id`.
    async fn update(
        &self,
        key: &str,
        id: i64,
        title: Option<&RecordTitle>,
        digest: Option<&SecretDigest>,
    ) -> VaultResult<Option<SensitiveRecord>>;

    /// Delete inside a transaction; `false` when no row matched
    async fn delete(&self, key: &str, id: i64) -> VaultResult<bool>;

    /// Load every record's digest for a blind-matching pass
    async fn load_digests(&self, key: &str) -> VaultResult<Vec<DigestEntry>>;
}
