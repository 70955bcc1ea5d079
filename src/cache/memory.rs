// ABOUTME: In-memory calculation cache with LRU eviction, TTL, and single-flight computation
// ABOUTME: Includes background cleanup task for expired entries
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{
    CacheConfig, CacheError, CacheLookup, CacheSource, CacheStats, CalculationCache,
    ComputeFuture,
};
use dashmap::DashMap;
use lru::LruCache;
use recipe_calc_core::errors::CalculationError;
use recipe_calc_engine::{CalculationResult, Fingerprint};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, OnceCell, RwLock};
use tokio::time;
use tracing::debug;
use uuid::Uuid;

type ComputeOutcome = Result<Arc<CalculationResult>, CalculationError>;
type Store = Arc<RwLock<CacheState>>;
type InflightMap = DashMap<Fingerprint, InflightSlot>;

/// Cached result with expiration and the recipe it was computed for
#[derive(Debug, Clone)]
struct CacheEntry {
    result: Arc<CalculationResult>,
    recipe_id: Uuid,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(result: Arc<CalculationResult>, recipe_id: Uuid, ttl: Duration) -> Self {
        Self {
            result,
            recipe_id,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// LRU entries plus a per-recipe index of their fingerprints
///
/// Every removal from `entries` goes through this type so the index never
/// refers to a fingerprint that is no longer stored.
struct CacheState {
    entries: LruCache<Fingerprint, CacheEntry>,
    by_recipe: HashMap<Uuid, HashSet<Fingerprint>>,
}

impl CacheState {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            by_recipe: HashMap::new(),
        }
    }

    fn unindex(&mut self, recipe_id: Uuid, fingerprint: &Fingerprint) {
        if let Some(keys) = self.by_recipe.get_mut(&recipe_id) {
            keys.remove(fingerprint);
            if keys.is_empty() {
                self.by_recipe.remove(&recipe_id);
            }
        }
    }

    /// Store an entry, returning whether another entry was evicted for room
    fn push(&mut self, fingerprint: Fingerprint, entry: CacheEntry) -> bool {
        let recipe_id = entry.recipe_id;
        // push returns the old value for an existing key, or the evicted LRU entry
        let displaced = self.entries.push(fingerprint, entry);
        if let Some((key, old)) = &displaced {
            self.unindex(old.recipe_id, key);
        }
        self.by_recipe.entry(recipe_id).or_default().insert(fingerprint);
        matches!(displaced, Some((key, _)) if key != fingerprint)
    }

    fn pop(&mut self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        let entry = self.entries.pop(fingerprint)?;
        self.unindex(entry.recipe_id, fingerprint);
        Some(entry)
    }

    /// Remove every entry computed for `recipe_id` without scanning the LRU
    fn remove_recipe(&mut self, recipe_id: Uuid) -> usize {
        let Some(keys) = self.by_recipe.remove(&recipe_id) else {
            return 0;
        };
        keys.iter()
            .filter(|key| self.entries.pop(*key).is_some())
            .count()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.by_recipe.clear();
    }
}

/// Shared cell of an in-flight computation
struct InflightSlot {
    recipe_id: Uuid,
    cell: Arc<OnceCell<ComputeOutcome>>,
}

/// Drops the leader's in-flight slot on every exit path, cancellation included
struct InflightGuard<'a> {
    inflight: &'a InflightMap,
    fingerprint: Fingerprint,
    cell: Arc<OnceCell<ComputeOutcome>>,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.inflight
            .remove_if(&self.fingerprint, |_, slot| Arc::ptr_eq(&slot.cell, &self.cell));
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    computations: AtomicU64,
    evictions: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// In-memory calculation cache with LRU eviction and background cleanup
///
/// Stored results live in an LRU behind `Arc<RwLock<..>>`, shared with the cleanup
/// task, alongside an index from recipe id to fingerprints for targeted
/// invalidation. In-flight computations are tracked per fingerprint in a `DashMap`
/// of shared `OnceCell`s; the first caller initializes the cell and later callers
/// await it. The leader removes the cell once its outcome has been moved into the
/// LRU (or has failed), so failures are never cached.
#[derive(Clone)]
pub struct InMemoryCalculationCache {
    store: Store,
    inflight: Arc<InflightMap>,
    counters: Arc<Counters>,
    capacity: usize,
    ttl: Duration,
    shutdown_tx: Option<Arc<mpsc::Sender<()>>>,
}

impl InMemoryCalculationCache {
    /// Default cache capacity when config specifies zero entries
    const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create the cache, spawning the cleanup task when enabled
    ///
    /// Must be called inside a Tokio runtime when background cleanup is enabled.
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CACHE_CAPACITY);

        let store: Store = Arc::new(RwLock::new(CacheState::new(capacity)));
        let counters = Arc::new(Counters::default());

        let shutdown_tx = if config.enable_background_cleanup {
            let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
            let store_clone = store.clone();
            let counters_clone = counters.clone();
            let cleanup_interval = config.cleanup_interval;

            tokio::spawn(async move {
                let mut interval = time::interval(cleanup_interval);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            Self::cleanup_expired(&store_clone, &counters_clone).await;
                        }
                        _ = shutdown_rx.recv() => {
                            debug!("Cache cleanup task received shutdown signal");
                            break;
                        }
                    }
                }
            });

            Some(Arc::new(shutdown_tx))
        } else {
            None
        };

        Self {
            store,
            inflight: Arc::new(DashMap::new()),
            counters,
            capacity: capacity.get(),
            ttl: config.ttl,
            shutdown_tx,
        }
    }

    /// Remove all expired entries from cache
    async fn cleanup_expired(store: &Store, counters: &Counters) {
        let mut store_guard = store.write().await;

        let expired_keys: Vec<Fingerprint> = store_guard
            .entries
            .iter()
            .filter_map(|(k, v)| if v.is_expired() { Some(*k) } else { None })
            .collect();

        for key in &expired_keys {
            store_guard.pop(key);
        }

        let removed = expired_keys.len();
        drop(store_guard);
        if removed > 0 {
            counters
                .evictions
                .fetch_add(removed as u64, Ordering::Relaxed);
            debug!("Cleaned up {} expired cache entries", removed);
        }
    }

    /// Stored, unexpired result for a fingerprint
    async fn lookup(&self, fingerprint: &Fingerprint) -> Option<Arc<CalculationResult>> {
        let mut store = self.store.write().await;

        // LruCache::get is mutable (updates access order for LRU)
        let expired = match store.entries.get(fingerprint) {
            Some(entry) if !entry.is_expired() => return Some(Arc::clone(&entry.result)),
            Some(_) => true,
            None => false,
        };
        if expired {
            store.pop(fingerprint);
            drop(store);
            Counters::bump(&self.counters.evictions);
        }
        None
    }

    async fn insert(&self, fingerprint: Fingerprint, recipe_id: Uuid, result: Arc<CalculationResult>) {
        let entry = CacheEntry::new(result, recipe_id, self.ttl);
        let evicted = self.store.write().await.push(fingerprint, entry);
        if evicted {
            Counters::bump(&self.counters.evictions);
        }
    }
}

#[async_trait::async_trait]
impl CalculationCache for InMemoryCalculationCache {
    async fn get_or_compute(
        &self,
        fingerprint: Fingerprint,
        recipe_id: Uuid,
        compute: ComputeFuture,
    ) -> Result<CacheLookup, CacheError> {
        if let Some(result) = self.lookup(&fingerprint).await {
            Counters::bump(&self.counters.hits);
            return Ok(CacheLookup {
                result,
                source: CacheSource::Hit,
            });
        }
        Counters::bump(&self.counters.misses);

        let cell = Arc::clone(
            &self
                .inflight
                .entry(fingerprint)
                .or_insert_with(|| InflightSlot {
                    recipe_id,
                    cell: Arc::new(OnceCell::new()),
                })
                .cell,
        );

        let mut source = CacheSource::Coalesced;
        let source_slot = &mut source;
        let outcome = cell
            .get_or_init(move || async move {
                // A previous leader may have stored the result after our lookup.
                if let Some(result) = self.lookup(&fingerprint).await {
                    *source_slot = CacheSource::Hit;
                    return Ok(result);
                }
                *source_slot = CacheSource::Computed;
                Counters::bump(&self.counters.computations);
                compute.await
            })
            .await
            .clone();

        if source == CacheSource::Coalesced {
            Counters::bump(&self.counters.coalesced);
        } else {
            let _leader = InflightGuard {
                inflight: &self.inflight,
                fingerprint,
                cell: Arc::clone(&cell),
            };
            if let (CacheSource::Computed, Ok(result)) = (source, &outcome) {
                self.insert(fingerprint, recipe_id, Arc::clone(result)).await;
            }
        }

        outcome
            .map(|result| CacheLookup { result, source })
            .map_err(CacheError::ComputeFailed)
    }

    async fn invalidate_recipe(&self, recipe_id: Uuid) -> Result<usize, CacheError> {
        let removed = self.store.write().await.remove_recipe(recipe_id);
        self.inflight.retain(|_, slot| slot.recipe_id != recipe_id);

        debug!(%recipe_id, removed, "Invalidated cached calculations");
        Ok(removed)
    }

    async fn clear_all(&self) -> Result<(), CacheError> {
        self.store.write().await.clear();
        // Leaders still running keep their own handle and finish normally
        self.inflight.clear();
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let entries = self.store.read().await.entries.len();
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        Ok(CacheStats {
            enabled: true,
            entries,
            capacity: self.capacity,
            hits: load(&self.counters.hits),
            misses: load(&self.counters.misses),
            coalesced: load(&self.counters.coalesced),
            computations: load(&self.counters.computations),
            evictions: load(&self.counters.evictions),
        })
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        // In-memory cache is always healthy
        Ok(())
    }
}

impl Drop for InMemoryCalculationCache {
    fn drop(&mut self) {
        // Only the last clone shuts the cleanup task down
        if let Some(tx) = &self.shutdown_tx {
            if Arc::strong_count(tx) > 1 {
                return;
            }
            if let Err(e) = tx.try_send(()) {
                debug!(error = ?e, "Cache shutdown signal send failed (channel likely closed)");
            }
        }
    }
}
