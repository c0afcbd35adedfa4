//! Lookup cache for select-box option lists
//!
//! Provides:
//! - Generic get/set operations with optional TTL
//! - Loader-based memoization (`get_or_load`)
//! - Manual invalidation, per key or wholesale
//!
//! One cache belongs to one admin session. The wizard clears it wholesale when
//! a run completes; nothing expires on its own unless a TTL is configured.

use crate::config::CacheConfig;
use crate::errors::{AppError, Result};
use crate::metrics::record_lookup;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.expires_at.map_or(true, |at| Instant::now() < at)
    }
}

/// Per-session memoizing lookup service
pub struct LookupCache {
    entries: RwLock<HashMap<String, Entry>>,
    config: CacheConfig,
}

impl Default for LookupCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl LookupCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Build a prefixed key
    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.config.key_prefix, key)
    }

    fn ttl(&self) -> Option<Duration> {
        (self.config.ttl_secs > 0).then(|| Duration::from_secs(self.config.ttl_secs))
    }

    /// Get a value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let full_key = self.key(key);
        let entries = self.entries.read().await;

        match entries.get(&full_key).filter(|entry| entry.is_live()) {
            Some(entry) => {
                let parsed = serde_json::from_value(entry.value.clone()).map_err(|e| {
                    AppError::Internal {
                        message: format!("Failed to read cached value '{}': {}", full_key, e),
                    }
                })?;
                debug!(key = %full_key, "Cache hit");
                record_lookup(key, true);
                Ok(Some(parsed))
            }
            None => {
                debug!(key = %full_key, "Cache miss");
                record_lookup(key, false);
                Ok(None)
            }
        }
    }

    /// Set a value in cache
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let full_key = self.key(key);
        let value = serde_json::to_value(value)?;
        let entry = Entry {
            value,
            expires_at: self.ttl().map(|ttl| Instant::now() + ttl),
        };

        self.entries.write().await.insert(full_key.clone(), entry);
        debug!(key = %full_key, "Cache set");
        Ok(())
    }

    /// Delete a key from cache
    pub async fn delete(&self, key: &str) -> bool {
        let full_key = self.key(key);
        let deleted = self.entries.write().await.remove(&full_key).is_some();
        debug!(key = %full_key, deleted, "Cache delete");
        deleted
    }

    /// Drop every entry
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        debug!(count, "Cache cleared");
    }

    /// Check if a live key exists
    pub async fn exists(&self, key: &str) -> bool {
        let full_key = self.key(key);
        self.entries
            .read()
            .await
            .get(&full_key)
            .map_or(false, Entry::is_live)
    }

    /// Get or set with a loader function
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, loader: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        if let Some(cached) = self.get::<T>(key).await? {
            return Ok(cached);
        }

        let value = loader().await?;

        if let Err(e) = self.set(key, &value).await {
            warn!(error = %e, "Failed to cache value, continuing without cache");
        }

        Ok(value)
    }
}

/// Cache key builder helpers
pub mod keys {
    pub fn project_types() -> String {
        "tipos_proyecto".to_string()
    }

    pub fn users() -> String {
        "usuarios".to_string()
    }
}
