//! Sensitive Data Store
//!
//! The credential-store operations: validation, digesting, persistence,
//! and blind matching. Plaintext secrets are digested here and discarded;
//! nothing below this layer ever sees them.

use std::sync::Arc;

use platform::digest::{ClearTextSecret, SecretDigest};

use crate::domain::entity::SensitiveRecord;
use crate::domain::repository::SensitiveRepository;
use crate::domain::value_object::RecordTitle;
use crate::error::{VaultError, VaultResult};

/// Store operations over a sensitive-record repository
pub struct SensitiveStore<R>
where
    R: SensitiveRepository,
{
    repo: Arc<R>,
}

impl<R> SensitiveStore<R>
where
    R: SensitiveRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Insert a new record; returns metadata only, never the digest
    pub async fn insert(
        &self,
        key: &str,
        title: RecordTitle,
        secret: ClearTextSecret,
    ) -> VaultResult<SensitiveRecord> {
        let digest = digest_blocking(secret).await?;
        let record = self.repo.insert(key, &title, &digest).await?;

        tracing::info!(id = record.id, "Sensitive record inserted");

        Ok(record)
    }

    pub async fn get(&self, key: &str, id: i64) -> VaultResult<SensitiveRecord> {
        self.repo
            .find_by_id(key, id)
            .await?
            .ok_or_else(VaultError::not_found)
    }

    pub async fn list(&self, key: &str) -> VaultResult<Vec<SensitiveRecord>> {
        self.repo.find_all(key).await
    }

    /// Update title and/or secret; at least one must be supplied
    ///
    /// The digest is recomputed only when a new secret is supplied.
    pub async fn update(
        &self,
        key: &str,
        id: i64,
        title: Option<RecordTitle>,
        secret: Option<ClearTextSecret>,
    ) -> VaultResult<SensitiveRecord> {
        if title.is_none() && secret.is_none() {
            return Err(VaultError::Validation(
                "No data provided to update".to_string(),
            ));
        }

        let digest = match secret {
            Some(secret) => Some(digest_blocking(secret).await?),
            None => None,
        };

        let record = self
            .repo
            .update(key, id, title.as_ref(), digest.as_ref())
            .await?
            .ok_or_else(VaultError::not_found)?;

        tracing::info!(id = record.id, "Sensitive record updated");

        Ok(record)
    }

    pub async fn delete(&self, key: &str, id: i64) -> VaultResult<()> {
        if self.repo.delete(key, id).await? {
            tracing::info!(id, "Sensitive record deleted");
            Ok(())
        } else {
            Err(VaultError::not_found())
        }
    }

    /// Blind-match a candidate against every stored digest
    ///
    /// The connection is released before verification begins. Digests are
    /// salted and non-comparable, so the pass is a full O(n) Argon2
    /// verification with no structural shortcut; it runs sequentially on
    /// the blocking pool, bounded only by the practical size of the
    /// table. Returns the titles of all matches.
    pub async fn blind_match(
        &self,
        key: &str,
        candidate: ClearTextSecret,
    ) -> VaultResult<Vec<String>> {
        let entries = self.repo.load_digests(key).await?;

        let titles = tokio::task::spawn_blocking(move || {
            entries
                .into_iter()
                .filter(|entry| entry.digest.verify(&candidate))
                .map(|entry| entry.title)
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| VaultError::Internal(format!("Verification task failed: {e}")))?;

        if titles.is_empty() {
            return Err(VaultError::NotFound("No matching data found"));
        }

        tracing::debug!(matches = titles.len(), "Blind match completed");

        Ok(titles)
    }
}

/// Digest on the blocking pool; Argon2 at the fixed parameters takes long
/// enough to stall an async worker otherwise.
async fn digest_blocking(secret: ClearTextSecret) -> VaultResult<SecretDigest> {
    tokio::task::spawn_blocking(move || secret.digest())
        .await
        .map_err(|e| VaultError::Internal(format!("Digest task failed: {e}")))?
        .map_err(VaultError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::DigestEntry;
    use chrono::Utc;
    use std::sync::Mutex;

    /// In-memory repository mirroring the row-effect semantics of the
    /// PostgreSQL implementation.
    #[derive(Default)]
    struct MemoryRepository {
        rows: Mutex<Vec<StoredRow>>,
        next_id: Mutex<i64>,
    }

    struct StoredRow {
        record: SensitiveRecord,
        digest: SecretDigest,
    }

    impl SensitiveRepository for MemoryRepository {
        async fn insert(
            &self,
            _key: &str,
            title: &RecordTitle,
            digest: &SecretDigest,
        ) -> VaultResult<SensitiveRecord> {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;

            let now = Utc::now();
            let record = SensitiveRecord {
                id: *next_id,
                title: title.as_str().to_string(),
                created_at: now,
                updated_at: now,
            };

            self.rows.lock().unwrap().push(StoredRow {
                record: record.clone(),
                digest: digest.clone(),
            });

            Ok(record)
        }

        async fn find_by_id(&self, _key: &str, id: i64) -> VaultResult<Option<SensitiveRecord>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.record.id == id)
                .map(|row| row.record.clone()))
        }

        async fn find_all(&self, _key: &str) -> VaultResult<Vec<SensitiveRecord>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .map(|row| row.record.clone())
                .collect())
        }

        async fn update(
            &self,
            _key: &str,
            id: i64,
            title: Option<&RecordTitle>,
            digest: Option<&SecretDigest>,
        ) -> VaultResult<Option<SensitiveRecord>> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.iter_mut().find(|row| row.record.id == id) else {
                return Ok(None);
            };

            if let Some(title) = title {
                row.record.title = title.as_str().to_string();
            }
            if let Some(digest) = digest {
                row.digest = digest.clone();
            }
            row.record.updated_at = Utc::now();

            Ok(Some(row.record.clone()))
        }

        async fn delete(&self, _key: &str, id: i64) -> VaultResult<bool> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.record.id != id);
            Ok(rows.len() < before)
        }

        async fn load_digests(&self, _key: &str) -> VaultResult<Vec<DigestEntry>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .map(|row| DigestEntry {
                    id: row.record.id,
                    title: row.record.title.clone(),
                    digest: row.digest.clone(),
                })
                .collect())
        }
    }

    fn store() -> SensitiveStore<MemoryRepository> {
        SensitiveStore::new(Arc::new(MemoryRepository::default()))
    }

    fn title(s: &str) -> RecordTitle {
        RecordTitle::new(s.to_string()).unwrap()
    }

    fn secret(s: &str) -> ClearTextSecret {
        ClearTextSecret::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_roundtrip() {
        let store = store();

        let inserted = store
            .insert("10.0.0.1", title("Card"), secret("4111111111111111"))
            .await
            .unwrap();

        let fetched = store.get("10.0.0.1", inserted.id).await.unwrap();
        assert_eq!(fetched.title, "Card");
        assert_eq!(fetched.id, inserted.id);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = store();
        let result = store.get("10.0.0.1", 42).await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_returns_all_metadata() {
        let store = store();
        store.insert("k", title("A"), secret("x")).await.unwrap();
        store.insert("k", title("B"), secret("y")).await.unwrap();

        let records = store.list("k").await.unwrap();
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_blind_match_returns_matching_titles() {
        let store = store();
        store.insert("k", title("A"), secret("x")).await.unwrap();
        store.insert("k", title("B"), secret("y")).await.unwrap();

        let titles = store.blind_match("k", secret("x")).await.unwrap();
        assert_eq!(titles, vec!["A".to_string()]);
    }

    #[tokio::test]
    async fn test_blind_match_no_match_is_not_found() {
        let store = store();
        store.insert("k", title("A"), secret("x")).await.unwrap();

        let result = store.blind_match("k", secret("z")).await;
        assert!(matches!(
            result,
            Err(VaultError::NotFound("No matching data found"))
        ));
    }

    #[tokio::test]
    async fn test_update_without_fields_is_validation_error() {
        let store = store();
        let inserted = store.insert("k", title("A"), secret("x")).await.unwrap();

        let result = store.update("k", inserted.id, None, None).await;
        assert!(matches!(result, Err(VaultError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let store = store();
        store.insert("k", title("A"), secret("x")).await.unwrap();

        let result = store.update("k", 999, Some(title("B")), None).await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));

        // Table unchanged
        let records = store.list("k").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "A");
    }

    #[tokio::test]
    async fn test_update_title_only_keeps_secret() {
        let store = store();
        let inserted = store.insert("k", title("A"), secret("x")).await.unwrap();

        let updated = store
            .update("k", inserted.id, Some(title("Renamed")), None)
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");

        // Old secret still matches under the new title
        let titles = store.blind_match("k", secret("x")).await.unwrap();
        assert_eq!(titles, vec!["Renamed".to_string()]);
    }

    #[tokio::test]
    async fn test_update_secret_recomputes_digest() {
        let store = store();
        let inserted = store.insert("k", title("A"), secret("x")).await.unwrap();

        store
            .update("k", inserted.id, None, Some(secret("swapped")))
            .await
            .unwrap();

        assert!(store.blind_match("k", secret("x")).await.is_err());
        let titles = store.blind_match("k", secret("swapped")).await.unwrap();
        assert_eq!(titles, vec!["A".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let store = store();
        let inserted = store.insert("k", title("A"), secret("x")).await.unwrap();

        store.delete("k", inserted.id).await.unwrap();

        let result = store.delete("k", inserted.id).await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));
        assert!(store.list("k").await.unwrap().is_empty());
    }
}
