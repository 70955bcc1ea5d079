// ABOUTME: Calculation cache abstraction keyed by request fingerprint
// ABOUTME: Single-flight get-or-compute contract with recipe-scoped invalidation and stats
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// In-memory cache implementation
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use recipe_calc_core::constants::cache::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CLEANUP_INTERVAL_SECS, TTL_CALCULATION_SECS,
};
use recipe_calc_core::errors::{AppError, CalculationError, ErrorCode};
use recipe_calc_engine::{CalculationResult, Fingerprint};
use serde::Serialize;
use uuid::Uuid;

/// Deferred computation handed to the cache on a miss
pub type ComputeFuture = BoxFuture<'static, Result<Arc<CalculationResult>, CalculationError>>;

/// Calculation cache with single-flight semantics
///
/// Concurrent callers resolving the same fingerprint share one computation: the
/// first caller runs the supplied future and every other caller waits for its
/// outcome instead of computing again.
#[async_trait::async_trait]
pub trait CalculationCache: Send + Sync {
    /// Return the cached result for `fingerprint`, or run `compute` once and cache it
    ///
    /// # Errors
    ///
    /// Returns `ComputeFailed` wrapping the computation's own error (failures are
    /// not cached), or `Unavailable` if the backend cannot be used
    async fn get_or_compute(
        &self,
        fingerprint: Fingerprint,
        recipe_id: Uuid,
        compute: ComputeFuture,
    ) -> Result<CacheLookup, CacheError>;

    /// Drop every entry computed for `recipe_id`, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backend cannot be used
    async fn invalidate_recipe(&self, recipe_id: Uuid) -> Result<usize, CacheError>;

    /// Drop every entry
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backend cannot be used
    async fn clear_all(&self) -> Result<(), CacheError>;

    /// Counters and occupancy
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backend cannot be used
    async fn stats(&self) -> Result<CacheStats, CacheError>;

    /// Verify the backend is usable
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if it is not
    async fn health_check(&self) -> Result<(), CacheError>;
}

/// How a lookup was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheSource {
    /// Served from a stored entry
    Hit,
    /// Computed by this caller
    Computed,
    /// Shared from another caller's in-flight computation
    Coalesced,
}

/// Result of [`CalculationCache::get_or_compute`]
#[derive(Debug, Clone)]
pub struct CacheLookup {
    /// The calculation result
    pub result: Arc<CalculationResult>,
    /// Where it came from
    pub source: CacheSource,
}

impl CacheLookup {
    /// Whether this caller did not run the computation itself
    #[must_use]
    pub fn was_cached(&self) -> bool {
        self.source != CacheSource::Computed
    }
}

/// Cache counters exposed through the stats endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Whether result caching is enabled at all
    pub enabled: bool,
    /// Entries currently stored
    pub entries: usize,
    /// Maximum entries before LRU eviction
    pub capacity: usize,
    /// Lookups served from a stored entry
    pub hits: u64,
    /// Lookups that found no stored entry
    pub misses: u64,
    /// Misses that joined another caller's computation
    pub coalesced: u64,
    /// Computations actually run
    pub computations: u64,
    /// Entries removed by capacity pressure or expiry
    pub evictions: u64,
}

/// Cache failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// Backend cannot serve requests; callers fall back to direct computation
    #[error("Calculation cache unavailable: {reason}")]
    Unavailable {
        /// Underlying failure
        reason: String,
    },

    /// The computation itself failed; carries the original error unchanged
    #[error("Cached computation failed: {0}")]
    ComputeFailed(#[source] CalculationError),
}

impl From<CacheError> for AppError {
    fn from(error: CacheError) -> Self {
        match error {
            CacheError::ComputeFailed(inner) => inner.into(),
            CacheError::Unavailable { .. } => {
                Self::new(ErrorCode::ResourceUnavailable, error.to_string())
            }
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Whether results are cached at all
    pub enabled: bool,
    /// Maximum number of entries (LRU eviction beyond this)
    pub max_entries: usize,
    /// Maximum age of an entry
    pub ttl: Duration,
    /// Interval of the background expiry sweep
    pub cleanup_interval: Duration,
    /// Enable the background expiry sweep (disable in tests)
    pub enable_background_cleanup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            ttl: Duration::from_secs(TTL_CALCULATION_SECS),
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            enable_background_cleanup: true,
        }
    }
}
