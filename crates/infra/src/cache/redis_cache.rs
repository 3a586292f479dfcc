//! Redis-backed cache layer.
//!
//! Keys are stored under a namespace (`stockroom:` by default) so several
//! applications can share one Redis. Prefix eviction walks the keyspace with
//! `SCAN MATCH` rather than `KEYS` to avoid blocking the server.

use std::sync::Arc;

use redis::aio::MultiplexedConnection;
use tokio::sync::OnceCell;
use tracing::instrument;

use super::{CacheError, CacheLayer, CacheResult};

const DEFAULT_NAMESPACE: &str = "stockroom:";

const SCAN_BATCH: usize = 200;

#[derive(Clone)]
pub struct RedisCache {
    client: Arc<redis::Client>,
    connection: Arc<OnceCell<MultiplexedConnection>>,
    namespace: String,
}

impl RedisCache {
    /// Create a cache client. No connection is made until first use; after
    /// that, every call shares one multiplexed connection.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `namespace` - key prefix (default: "stockroom:")
    pub fn new(redis_url: impl AsRef<str>, namespace: Option<String>) -> CacheResult<Self> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            connection: Arc::new(OnceCell::new()),
            namespace: namespace.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        })
    }

    async fn connection(&self) -> CacheResult<MultiplexedConnection> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                tracing::debug!("opening redis connection");
                self.client.get_multiplexed_async_connection().await
            })
            .await
            .map_err(command_error)?;
        Ok(conn.clone())
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("namespace", &self.namespace)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

/// Escape glob metacharacters so a literal prefix can be used with MATCH.
fn escape_glob(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn command_error(e: redis::RedisError) -> CacheError {
    CacheError::Backend(e.to_string())
}

#[async_trait::async_trait]
impl CacheLayer for RedisCache {
    #[instrument(skip(self), err)]
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        redis::cmd("GET")
            .arg(self.key(key))
            .query_async::<_, Option<String>>(&mut conn)
            .await
            .map_err(command_error)
    }

    #[instrument(skip(self, value), err)]
    async fn put(&self, key: &str, value: String) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(self.key(key))
            .arg(value)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(command_error)
    }

    #[instrument(skip(self), err)]
    async fn evict(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("DEL")
            .arg(self.key(key))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(command_error)
    }

    #[instrument(skip(self), err)]
    async fn evict_prefix(&self, prefix: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}*", escape_glob(&self.key(prefix)));
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(command_error)?;

            if !keys.is_empty() {
                redis::cmd("DEL")
                    .arg(&keys)
                    .query_async::<_, ()>(&mut conn)
                    .await
                    .map_err(command_error)?;
            }

            if next == 0 {
                return Ok(());
            }
            cursor = next;
        }
    }
}
