// ABOUTME: Shared server resources built once at startup and handed to every route
// ABOUTME: Wires the catalog store, calculation cache, history, and services together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use recipe_calc_engine::ScalingEngine;
use tracing::info;

use crate::cache::memory::InMemoryCalculationCache;
use crate::cache::CalculationCache;
use crate::catalog::{CatalogStore, InMemoryCatalog};
use crate::config::ServerConfig;
use crate::history::{HistoryRecorder, InMemoryHistory};
use crate::services::{BatchCoordinator, CalculationService, RecipeService};

/// Centralized resource container for dependency injection
pub struct ServerResources {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Product and recipe store
    pub catalog: Arc<dyn CatalogStore>,
    /// Single calculations, history, and cache administration
    pub calculations: Arc<CalculationService>,
    /// Batch execution
    pub batch: BatchCoordinator,
    /// Catalog writes and maintenance
    pub recipes: Arc<RecipeService>,
}

impl ServerResources {
    /// Build resources over an empty in-memory catalog
    ///
    /// Must be called inside a Tokio runtime when background cache cleanup is enabled.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let catalog: Arc<dyn CatalogStore> =
            Arc::new(InMemoryCatalog::new(config.catalog.clone()));
        Self::with_catalog(config, catalog)
    }

    /// Build resources over an existing catalog store
    #[must_use]
    pub fn with_catalog(config: ServerConfig, catalog: Arc<dyn CatalogStore>) -> Self {
        let cache: Option<Arc<dyn CalculationCache>> = if config.cache.enabled {
            Some(Arc::new(InMemoryCalculationCache::new(&config.cache)))
        } else {
            None
        };
        let history: Option<Arc<dyn HistoryRecorder>> = if config.history.enabled {
            Some(Arc::new(InMemoryHistory::new(config.history.max_entries)))
        } else {
            None
        };

        info!(
            cache_enabled = cache.is_some(),
            history_enabled = history.is_some(),
            "Server resources initialized"
        );

        let calculations = Arc::new(CalculationService::new(
            ScalingEngine::new(config.engine.clone()),
            Arc::clone(&catalog),
            cache.clone(),
            history,
        ));
        let batch = BatchCoordinator::new(Arc::clone(&calculations), config.batch.clone());
        let recipes = Arc::new(RecipeService::new(Arc::clone(&catalog), cache));

        Self {
            config: Arc::new(config),
            catalog,
            calculations,
            batch,
            recipes,
        }
    }
}
