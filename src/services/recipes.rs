// ABOUTME: Catalog maintenance: product and recipe writes, dry-run validation, where-used
// ABOUTME: Also runs the parallel whole-catalog cycle audit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use recipe_calc_core::errors::CatalogError;
use recipe_calc_core::models::{Product, Recipe, RecipeDraft};
use recipe_calc_engine::{CycleReport, DependencyGraph};
use serde::Serialize;
use tokio::task;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::CalculationCache;
use crate::catalog::{CatalogStore, SavedRecipe};

/// Result of a whole-catalog audit
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Products inspected
    pub products: usize,
    /// Recipes inspected
    pub recipes: usize,
    /// Every distinct cycle found
    pub cycles: Vec<CycleReport>,
}

/// Catalog write path and maintenance queries
pub struct RecipeService {
    catalog: Arc<dyn CatalogStore>,
    cache: Option<Arc<dyn CalculationCache>>,
}

impl RecipeService {
    /// Create the service; the cache, when present, is pruned after recipe edits
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>, cache: Option<Arc<dyn CalculationCache>>) -> Self {
        Self { catalog, cache }
    }

    /// Create or replace a product
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` for an invalid name
    pub async fn upsert_product(&self, product: Product) -> Result<Product, CatalogError> {
        self.catalog.upsert_product(product).await
    }

    /// Look up a product
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if absent
    pub async fn get_product(&self, product_id: Uuid) -> Result<Product, CatalogError> {
        self.catalog.get_product(product_id).await
    }

    /// Look up a recipe
    ///
    /// # Errors
    ///
    /// Returns `RecipeNotFound` if absent
    pub async fn get_recipe(&self, recipe_id: Uuid) -> Result<Recipe, CatalogError> {
        self.catalog.get_recipe(recipe_id).await
    }

    /// Validate and persist a recipe
    ///
    /// Results cached under an older version are unreachable by fingerprint once the
    /// version changes; they are dropped here as well to free capacity.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed`, `CycleDetected` or `Conflict`
    pub async fn save_recipe(&self, draft: RecipeDraft) -> Result<SavedRecipe, CatalogError> {
        let saved = self.catalog.save_recipe(draft).await?;
        if saved.version_bumped && !saved.created {
            if let Some(cache) = &self.cache {
                if let Err(error) = cache.invalidate_recipe(saved.recipe.id).await {
                    warn!(recipe_id = %saved.recipe.id, %error, "Cache invalidation skipped");
                }
            }
        }
        Ok(saved)
    }

    /// Run every write-time check without persisting
    ///
    /// # Errors
    ///
    /// Returns the error [`Self::save_recipe`] would return
    pub async fn validate_recipe(&self, draft: &RecipeDraft) -> Result<(), CatalogError> {
        self.catalog.validate_recipe(draft).await
    }

    /// Products that use `product_id` directly as an ingredient
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if absent
    pub async fn used_by(&self, product_id: Uuid) -> Result<Vec<Product>, CatalogError> {
        self.catalog.used_by(product_id).await
    }

    /// Scan the whole catalog for cycles that bypassed write-time validation
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the catalog cannot be read
    pub async fn audit(&self) -> Result<AuditReport, CatalogError> {
        let snapshot = self.catalog.snapshot().await?;
        let report = task::spawn_blocking(move || {
            let graph = DependencyGraph::from_catalog(snapshot.as_ref());
            AuditReport {
                products: snapshot.product_count(),
                recipes: snapshot.recipe_count(),
                cycles: graph.audit(),
            }
        })
        .await
        .map_err(|e| CatalogError::Unavailable {
            reason: format!("Audit task failed: {e}"),
        })?;
        info!(
            products = report.products,
            recipes = report.recipes,
            cycles = report.cycles.len(),
            "Catalog audit completed"
        );
        Ok(report)
    }
}
