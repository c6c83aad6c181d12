// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Cache store implementations

use crate::cache::{CacheStore, CacheStoreError, CachedContent, CreateCacheRequest};
use crate::clock::Clock;
use crate::tokens::estimate_tokens;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Process-local store
///
/// Enforces a minimum payload size the way remote context stores do and
/// keeps expired entries listed until someone deletes them.
pub struct InMemoryCacheStore {
    clock: Arc<dyn Clock>,
    min_tokens: u64,
    entries: Mutex<Vec<CachedContent>>,
    next_id: AtomicU64,
}

impl InMemoryCacheStore {
    /// Store with no minimum size
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            min_tokens: 0,
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Reject payloads estimated below `min_tokens`
    #[must_use]
    pub fn with_min_tokens(mut self, min_tokens: u64) -> Self {
        self.min_tokens = min_tokens;
        self
    }

    /// Number of stored entries, expired ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Insert an entry as-is, bypassing size checks
    pub fn insert(&self, content: CachedContent) {
        self.lock().push(content);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CachedContent>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn create(&self, request: CreateCacheRequest) -> Result<CachedContent, CacheStoreError> {
        let tokens = estimate_tokens(&request.content);
        if tokens < self.min_tokens {
            return Err(CacheStoreError::Rejected(format!(
                "content has about {tokens} tokens, minimum is {}",
                self.min_tokens
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let content = CachedContent {
            name: format!("cachedContents/{id}"),
            display_name: request.display_name,
            model: request.model,
            created_at: self.clock.now(),
            ttl: request.ttl,
        };
        self.lock().push(content.clone());
        Ok(content)
    }

    async fn list_active(&self) -> Result<Vec<CachedContent>, CacheStoreError> {
        Ok(self.lock().clone())
    }

    async fn delete(&self, name: &str) -> Result<(), CacheStoreError> {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|entry| entry.name != name);
        if entries.len() == before {
            return Err(CacheStoreError::NotFound(name.to_string()));
        }
        Ok(())
    }
}

/// Store for backends without server-side caching
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCacheStore;

#[async_trait]
impl CacheStore for DisabledCacheStore {
    async fn create(&self, _request: CreateCacheRequest) -> Result<CachedContent, CacheStoreError> {
        Err(CacheStoreError::Disabled)
    }

    async fn list_active(&self) -> Result<Vec<CachedContent>, CacheStoreError> {
        Ok(Vec::new())
    }

    async fn delete(&self, name: &str) -> Result<(), CacheStoreError> {
        Err(CacheStoreError::NotFound(name.to_string()))
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
