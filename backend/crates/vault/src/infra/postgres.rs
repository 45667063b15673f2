//! PostgreSQL Repository Implementation
//!
//! Writes follow one discipline: begin, execute, verify the expected row
//! effect, commit. An error or row-count mismatch rolls the transaction
//! back before the connection is released. Reads run outside a
//! transaction and observe the engine's default isolation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::digest::SecretDigest;
use sqlx::{Connection, Postgres, QueryBuilder};

use crate::domain::entity::{DigestEntry, SensitiveRecord};
use crate::domain::repository::SensitiveRepository;
use crate::domain::value_object::RecordTitle;
use crate::error::{VaultError, VaultResult};
use crate::infra::pool::PoolRouter;

/// PostgreSQL-backed sensitive-record repository
///
/// Every operation acquires its connection through the pool router with
/// the caller's key, so a caller keeps landing on the same node while it
/// is reachable.
#[derive(Clone)]
pub struct PgSensitiveRepository {
    router: Arc<PoolRouter>,
}

impl PgSensitiveRepository {
    pub fn new(router: Arc<PoolRouter>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &PoolRouter {
        &self.router
    }
}

impl SensitiveRepository for PgSensitiveRepository {
    async fn insert(
        &self,
        key: &str,
        title: &RecordTitle,
        digest: &SecretDigest,
    ) -> VaultResult<SensitiveRecord> {
        let mut conn = self.router.acquire(key).await?;
        let mut tx = conn.begin().await?;

        let row = sqlx::query_as::<_, SensitiveRow>(
            r#"
            INSERT INTO sensitive_data (hash, title)
            VALUES ($1, $2)
            RETURNING id, title, created_at, updated_at
            "#,
        )
        .bind(digest.as_phc_string())
        .bind(title.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into_record())
    }

    async fn find_by_id(&self, key: &str, id: i64) -> VaultResult<Option<SensitiveRecord>> {
        let mut conn = self.router.acquire(key).await?;

        let row = sqlx::query_as::<_, SensitiveRow>(
            r#"
            SELECT id, title, created_at, updated_at
            FROM sensitive_data
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(SensitiveRow::into_record))
    }

    async fn find_all(&self, key: &str) -> VaultResult<Vec<SensitiveRecord>> {
        let mut conn = self.router.acquire(key).await?;

        let rows = sqlx::query_as::<_, SensitiveRow>(
            r#"
            SELECT id, title, created_at, updated_at
            FROM sensitive_data
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(SensitiveRow::into_record).collect())
    }

    async fn update(
        &self,
        key: &str,
        id: i64,
        title: Option<&RecordTitle>,
        digest: Option<&SecretDigest>,
    ) -> VaultResult<Option<SensitiveRecord>> {
        let mut conn = self.router.acquire(key).await?;
        let mut tx = conn.begin().await?;

        let mut query = QueryBuilder::<Postgres>::new("UPDATE sensitive_data SET updated_at = now()");
        if let Some(title) = title {
            query.push(", title = ").push_bind(title.as_str());
        }
        if let Some(digest) = digest {
            query.push(", hash = ").push_bind(digest.as_phc_string());
        }
        query.push(" WHERE id = ").push_bind(id);
        query.push(" RETURNING id, title, created_at, updated_at");

        let row = query
            .build_query_as::<SensitiveRow>()
            .fetch_optional(&mut *tx)
            .await?;

        match row {
            Some(row) => {
                tx.commit().await?;
                Ok(Some(row.into_record()))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    async fn delete(&self, key: &str, id: i64) -> VaultResult<bool> {
        let mut conn = self.router.acquire(key).await?;
        let mut tx = conn.begin().await?;

        let affected = sqlx::query("DELETE FROM sensitive_data WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if affected == 0 {
            tx.rollback().await?;
            Ok(false)
        } else {
            tx.commit().await?;
            Ok(true)
        }
    }

    async fn load_digests(&self, key: &str) -> VaultResult<Vec<DigestEntry>> {
        let mut conn = self.router.acquire(key).await?;

        let rows = sqlx::query_as::<_, DigestRow>(
            r#"
            SELECT id, title, hash
            FROM sensitive_data
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(DigestRow::into_entry).collect()
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct SensitiveRow {
    id: i64,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SensitiveRow {
    fn into_record(self) -> SensitiveRecord {
        SensitiveRecord {
            id: self.id,
            title: self.title,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DigestRow {
    id: i64,
    title: String,
    hash: String,
}

impl DigestRow {
    fn into_entry(self) -> VaultResult<DigestEntry> {
        let digest = SecretDigest::from_phc_string(self.hash)
            .map_err(|e| VaultError::Internal(format!("Invalid digest for record {}: {}", self.id, e)))?;

        Ok(DigestEntry {
            id: self.id,
            title: self.title,
            digest,
        })
    }
}
