//! Schema type cache
//!
//! Schema ids are immutable in a registry, so a resolved id never needs to
//! be looked up again. [`CachingResolver`] keeps successful lookups in a
//! bounded in-memory cache; failures are not cached and are retried on the
//! next record carrying the same id.

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use topicaudit_core::{ResolveError, SchemaTypeResolver};

/// Default number of schema ids kept in memory
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Caches successful lookups of an inner resolver.
pub struct CachingResolver<R> {
    inner: R,
    cache: Cache<u32, Option<String>>,
}

impl<R: SchemaTypeResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: R, max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).build();
        Self { inner, cache }
    }
}

#[async_trait]
impl<R: SchemaTypeResolver> SchemaTypeResolver for CachingResolver<R> {
    async fn lookup(&self, schema_id: u32) -> Result<Option<String>, ResolveError> {
        if let Some(schema_type) = self.cache.get(&schema_id).await {
            return Ok(schema_type);
        }

        let schema_type = self.inner.lookup(schema_id).await?;
        self.cache.insert(schema_id, schema_type.clone()).await;
        debug!(schema_id, "Cached schema type");
        Ok(schema_type)
    }
}
