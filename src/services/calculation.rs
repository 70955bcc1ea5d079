// ABOUTME: Calculation orchestration over catalog snapshots, the result cache, and history
// ABOUTME: Cache and history are best effort; their failures degrade to direct computation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Instant;

use recipe_calc_core::errors::CalculationError;
use recipe_calc_core::models::CatalogSnapshot;
use recipe_calc_engine::{
    CalculationRequest, CalculationResult, Fingerprint, ResolvedRequest, ScalingEngine,
};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::cache::{CacheError, CacheStats, CalculationCache, ComputeFuture};
use crate::catalog::CatalogStore;
use crate::history::{HistoryEntry, HistoryQuery, HistoryRecorder};
use crate::logging::AppLogger;

/// A served calculation with its delivery metadata
///
/// `result` is deterministic for a given fingerprint; `cached` and
/// `calculation_time_ms` describe this particular delivery.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationOutcome {
    /// The calculation result
    pub result: Arc<CalculationResult>,
    /// Cache key of the request
    pub fingerprint: Fingerprint,
    /// Whether the result was served without this request computing it
    pub cached: bool,
    /// Wall-clock time spent serving the request
    pub calculation_time_ms: u64,
}

/// Runs calculations end to end
pub struct CalculationService {
    engine: ScalingEngine,
    catalog: Arc<dyn CatalogStore>,
    cache: Option<Arc<dyn CalculationCache>>,
    history: Option<Arc<dyn HistoryRecorder>>,
}

impl CalculationService {
    /// Create the service; `None` disables caching or history
    #[must_use]
    pub fn new(
        engine: ScalingEngine,
        catalog: Arc<dyn CatalogStore>,
        cache: Option<Arc<dyn CalculationCache>>,
        history: Option<Arc<dyn HistoryRecorder>>,
    ) -> Self {
        Self {
            engine,
            catalog,
            cache,
            history,
        }
    }

    /// Scaling engine in use
    #[must_use]
    pub const fn engine(&self) -> &ScalingEngine {
        &self.engine
    }

    /// Calculate one request
    ///
    /// # Errors
    ///
    /// Returns the engine's error for this request. Cache and history failures are
    /// logged and never returned.
    #[instrument(skip(self, request), fields(recipe_id = %request.recipe_id))]
    pub async fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationOutcome, CalculationError> {
        let started = Instant::now();

        let snapshot = self
            .catalog
            .snapshot()
            .await
            .map_err(|e| CalculationError::CatalogUnavailable {
                reason: e.to_string(),
            })?;
        let resolved = self.engine.resolve(request)?;
        let fingerprint = Fingerprint::compute(snapshot.as_ref(), &resolved)?;

        let (result, cached) = self
            .compute_cached(fingerprint, &snapshot, resolved)
            .await?;

        let calculation_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        AppLogger::log_calculation(
            result.recipe_id,
            result.target_quantity,
            result.scale_factor,
            result.ingredients.len(),
            calculation_time_ms,
            cached,
        );

        if let Some(history) = &self.history {
            if let Err(error) = history
                .record(Arc::clone(&result), cached, calculation_time_ms)
                .await
            {
                AppLogger::log_degraded("history", &error.to_string());
            }
        }

        Ok(CalculationOutcome {
            result,
            fingerprint,
            cached,
            calculation_time_ms,
        })
    }

    async fn compute_cached(
        &self,
        fingerprint: Fingerprint,
        snapshot: &Arc<CatalogSnapshot>,
        resolved: ResolvedRequest,
    ) -> Result<(Arc<CalculationResult>, bool), CalculationError> {
        let Some(cache) = &self.cache else {
            return self.compute_direct(snapshot, &resolved);
        };

        let engine = self.engine.clone();
        let catalog = Arc::clone(snapshot);
        let compute: ComputeFuture = Box::pin(async move {
            engine.calculate(catalog.as_ref(), &resolved).map(Arc::new)
        });

        match cache
            .get_or_compute(fingerprint, resolved.recipe_id, compute)
            .await
        {
            Ok(lookup) => {
                debug!(%fingerprint, source = ?lookup.source, "Cache lookup");
                let cached = lookup.was_cached();
                Ok((lookup.result, cached))
            }
            Err(CacheError::ComputeFailed(inner)) => Err(inner),
            Err(error @ CacheError::Unavailable { .. }) => {
                AppLogger::log_degraded("calculation_cache", &error.to_string());
                self.compute_direct(snapshot, &resolved)
            }
        }
    }

    fn compute_direct(
        &self,
        snapshot: &Arc<CatalogSnapshot>,
        resolved: &ResolvedRequest,
    ) -> Result<(Arc<CalculationResult>, bool), CalculationError> {
        let result = self.engine.calculate(snapshot.as_ref(), resolved)?;
        Ok((Arc::new(result), false))
    }

    /// History entries, newest first; empty when history is disabled
    pub async fn history(&self, query: &HistoryQuery) -> Vec<HistoryEntry> {
        let Some(history) = &self.history else {
            return Vec::new();
        };
        match history.list(query).await {
            Ok(entries) => entries,
            Err(error) => {
                AppLogger::log_degraded("history", &error.to_string());
                Vec::new()
            }
        }
    }

    /// Drop cached results for one recipe, or all of them
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the cache backend cannot be used
    pub async fn clear_cache(&self, recipe_id: Option<Uuid>) -> Result<usize, CacheError> {
        let Some(cache) = &self.cache else {
            return Ok(0);
        };
        match recipe_id {
            Some(recipe_id) => cache.invalidate_recipe(recipe_id).await,
            None => {
                let entries = cache.stats().await.map_or(0, |stats| stats.entries);
                cache.clear_all().await?;
                Ok(entries)
            }
        }
    }

    /// Cache counters; all zero with `enabled: false` when caching is off
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the cache backend cannot be used
    pub async fn cache_stats(&self) -> Result<CacheStats, CacheError> {
        match &self.cache {
            Some(cache) => cache.stats().await,
            None => Ok(CacheStats::default()),
        }
    }

    /// Whether the cache backend answers
    pub async fn cache_healthy(&self) -> bool {
        match &self.cache {
            Some(cache) => cache.health_check().await.is_ok(),
            None => true,
        }
    }
}
