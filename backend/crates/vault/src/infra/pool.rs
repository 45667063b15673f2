//! Multi-node Connection Pool Router
//!
//! Owns one connection pool per backing database node and routes each
//! caller to a node by a stable hash of its key, probing the remaining
//! nodes in index order when the preferred node refuses a connection.
//!
//! The hash gives soft key-affinity (the same caller tends to land on the
//! same node, useful for node-local caching) without a coordination
//! service; linear probing trades strict affinity for availability when a
//! node is down. This is not a consistent-hashing ring: changing the node
//! set reshuffles most keys' placement.

use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::Postgres;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DbConfig;
use crate::error::{VaultError, VaultResult};

/// Largest integer exactly representable as a double (2^53 - 1)
///
/// The accumulator is folded modulo this bound, keeping placements
/// comparable with external tooling that computes the same hash in
/// float-based languages.
const LARGE_SAFE_INT: i64 = 9_007_199_254_740_991;

/// Stable non-negative hash of a routing key
///
/// Folds characters into a running accumulator; the empty key hashes
/// to 0. Deterministic across calls and processes.
pub fn key_hash(key: &str) -> u64 {
    let mut hash: i64 = 0;
    for ch in key.chars() {
        hash = (hash * 31 + ch as i64) % LARGE_SAFE_INT;
    }
    hash.unsigned_abs()
}

/// One backing database node and its pool
struct PoolNode {
    host: String,
    pool: PgPool,
    /// In-memory health signal: flipped on failed acquisition, restored on
    /// success, never independently re-probed. Diagnostics only; the node
    /// is retried on the very next request regardless.
    healthy: AtomicBool,
}

/// Hash-and-probe router over a fixed set of connection pools
///
/// Constructed once at process start via [`PoolRouter::open`] and shared
/// across all in-flight requests; [`PoolRouter::close`] drains the pools
/// at shutdown.
pub struct PoolRouter {
    nodes: Vec<PoolNode>,
}

impl PoolRouter {
    /// Construct one lazy-connecting pool per configured node
    ///
    /// Pools open their first connection on first acquisition, so a node
    /// that is unreachable at startup does not prevent the process from
    /// serving through the remaining nodes.
    pub fn open(config: &DbConfig) -> VaultResult<Self> {
        if config.hosts.is_empty() {
            return Err(VaultError::Internal(
                "At least one database host must be configured".to_string(),
            ));
        }

        let mut nodes = Vec::with_capacity(config.hosts.len());
        for host in &config.hosts {
            let pool = PgPoolOptions::new()
                .max_connections(config.connection_limit)
                .acquire_timeout(config.acquire_timeout)
                .connect_lazy(&config.node_url(host))
                .map_err(|e| {
                    VaultError::Internal(format!("Invalid connection options for {host}: {e}"))
                })?;

            nodes.push(PoolNode {
                host: host.clone(),
                pool,
                healthy: AtomicBool::new(true),
            });
        }

        tracing::info!(node_count = nodes.len(), "Opened database connection pools");

        Ok(Self { nodes })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Index of the node a key prefers before any probing
    pub fn preferred_index(&self, key: &str) -> usize {
        (key_hash(key) % self.nodes.len() as u64) as usize
    }

    /// Snapshot of per-node health flags, in node order
    pub fn health(&self) -> Vec<(String, bool)> {
        self.nodes
            .iter()
            .map(|node| (node.host.clone(), node.healthy.load(Ordering::Relaxed)))
            .collect()
    }

    /// Acquire a connection for `key`
    ///
    /// Starts at the preferred node and attempts every node exactly once
    /// in index order, wrapping. Fails with `PoolUnavailable` only when
    /// every node refused a connection; the variant carries which hosts
    /// were tried for server-side diagnostics. Dropping the returned
    /// connection hands it back to its pool on every exit path.
    pub async fn acquire(&self, key: &str) -> VaultResult<PoolConnection<Postgres>> {
        let start = self.preferred_index(key);
        let mut tried = Vec::with_capacity(self.nodes.len());

        for offset in 0..self.nodes.len() {
            let node = &self.nodes[(start + offset) % self.nodes.len()];

            tracing::debug!(host = %node.host, "Attempting to get connection from pool");

            match node.pool.acquire().await {
                Ok(conn) => {
                    node.healthy.store(true, Ordering::Relaxed);
                    return Ok(conn);
                }
                Err(e) => {
                    node.healthy.store(false, Ordering::Relaxed);
                    tracing::warn!(
                        host = %node.host,
                        error = %e,
                        "Failed to get connection from pool"
                    );
                    tried.push(node.host.clone());
                }
            }
        }

        Err(VaultError::PoolUnavailable { tried })
    }

    /// Close every pool; part of the process shutdown sequence
    pub async fn close(&self) {
        for node in &self.nodes {
            node.pool.close().await;
        }
        tracing::info!("Closed database connection pools");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unreachable_config(hosts: &[&str]) -> DbConfig {
        DbConfig {
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
            // Port 1 on loopback refuses immediately
            port: 1,
            user: "vault".to_string(),
            password: "secret".to_string(),
            database: "sensitive".to_string(),
            connection_limit: 2,
            acquire_timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_key_hash_deterministic() {
        let a = key_hash("192.168.1.10");
        let b = key_hash("192.168.1.10");
        assert_eq!(a, b);
        assert_ne!(key_hash("192.168.1.10"), key_hash("192.168.1.11"));
    }

    #[test]
    fn test_key_hash_empty_is_zero() {
        assert_eq!(key_hash(""), 0);
    }

    #[test]
    fn test_key_hash_accumulator() {
        // Single character: hash = 0 * 31 + code
        assert_eq!(key_hash("a"), 'a' as u64);
        // Two characters: hash = (code1 * 31) + code2
        assert_eq!(key_hash("ab"), 'a' as u64 * 31 + 'b' as u64);
    }

    #[tokio::test]
    async fn test_preferred_index_stable() {
        let router =
            PoolRouter::open(&unreachable_config(&["127.0.0.1", "127.0.0.2", "127.0.0.3"]))
                .unwrap();

        for key in ["10.0.0.1", "10.0.0.2", "unknown", ""] {
            let first = router.preferred_index(key);
            assert_eq!(first, router.preferred_index(key));
            assert!(first < router.node_count());
            assert_eq!(first, (key_hash(key) % 3) as usize);
        }
    }

    #[test]
    fn test_open_rejects_empty_host_set() {
        let result = PoolRouter::open(&unreachable_config(&[]));
        assert!(matches!(result, Err(VaultError::Internal(_))));
    }

    #[tokio::test]
    async fn test_acquire_probes_every_node_once() {
        let hosts = ["127.0.0.1", "127.0.0.2", "127.0.0.3"];
        let router = PoolRouter::open(&unreachable_config(&hosts)).unwrap();

        let key = "10.0.0.1";
        let start = router.preferred_index(key);

        match router.acquire(key).await {
            Err(VaultError::PoolUnavailable { tried }) => {
                // Exactly node_count attempts, starting at the preferred
                // index and wrapping in order
                assert_eq!(tried.len(), hosts.len());
                for (offset, host) in tried.iter().enumerate() {
                    assert_eq!(host, hosts[(start + offset) % hosts.len()]);
                }
            }
            other => panic!("expected PoolUnavailable, got {:?}", other.map(|_| ())),
        }

        // All nodes marked degraded after the failed pass
        assert!(router.health().iter().all(|(_, healthy)| !healthy));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let router = PoolRouter::open(&unreachable_config(&["127.0.0.1"])).unwrap();
        router.close().await;
        router.close().await;
    }
}
