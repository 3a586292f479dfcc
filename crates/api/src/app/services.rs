//! Backend wiring: which store and cache the façades run on.

use std::sync::Arc;

use thiserror::Error;

use stockroom_core::PageLimits;
use stockroom_infra::cache::{CacheError, InMemoryCache};
use stockroom_infra::config::{AppConfig, PersistenceConfig};
use stockroom_infra::services::Services;
use stockroom_infra::store::{InMemoryStore, StoreError, Stores};

/// Everything a handler needs: the façades plus the paging policy.
#[derive(Clone)]
pub struct AppServices {
    pub services: Services,
    pub page_limits: PageLimits,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("store initialisation failed: {0}")]
    Store(#[from] StoreError),

    #[error("cache initialisation failed: {0}")]
    Cache(#[from] CacheError),
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    let services = match &config.persistence {
        Some(persistence) => build_persistent_services(persistence).await?,
        None => build_in_memory_services(),
    };

    Ok(AppServices {
        services,
        page_limits: config.page_limits(),
    })
}

/// In-memory store and cache (dev/test).
pub fn build_in_memory_services() -> Services {
    tracing::info!(store = "in-memory", cache = "in-memory", "wiring services");
    Services::new(
        Stores::from_backend(Arc::new(InMemoryStore::new())),
        Arc::new(InMemoryCache::new()),
    )
}

#[cfg(not(feature = "redis"))]
async fn build_persistent_services(
    _persistence: &PersistenceConfig,
) -> Result<Services, StartupError> {
    tracing::warn!(
        "USE_PERSISTENT_STORES=true but redis feature not enabled, falling back to in-memory"
    );
    Ok(build_in_memory_services())
}

#[cfg(feature = "redis")]
async fn build_persistent_services(
    persistence: &PersistenceConfig,
) -> Result<Services, StartupError> {
    use stockroom_infra::cache::RedisCache;
    use stockroom_infra::store::PostgresStore;

    let store =
        PostgresStore::connect(&persistence.database_url, persistence.db_max_connections).await?;
    store.migrate().await?;
    let cache = RedisCache::new(&persistence.redis_url, None)?;

    tracing::info!(
        store = "postgres",
        cache = "redis",
        max_connections = persistence.db_max_connections,
        "wiring services"
    );
    Ok(Services::new(
        Stores::from_backend(Arc::new(store)),
        Arc::new(cache),
    ))
}
