// ABOUTME: In-memory catalog store publishing copy-on-write snapshots
// ABOUTME: Recipe writes are validated and committed under a single write lock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use chrono::Utc;
use recipe_calc_core::errors::CatalogError;
use recipe_calc_core::models::{CatalogReader, CatalogSnapshot, Product, Recipe, RecipeDraft};
use recipe_calc_engine::graph::{validate_draft, DependencyGraph};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{check_product, check_recipe_rules, CatalogStore, SavedRecipe};
use crate::config::CatalogConfig;

/// Catalog held in memory as a shared, copy-on-write snapshot
///
/// Readers clone the current `Arc` and keep a stable view for as long as they
/// need it. Writers mutate through `Arc::make_mut` while holding the write lock,
/// which copies the snapshot only when readers still hold the previous one.
pub struct InMemoryCatalog {
    state: RwLock<Arc<CatalogSnapshot>>,
    config: CatalogConfig,
}

impl InMemoryCatalog {
    /// Empty catalog
    #[must_use]
    pub fn new(config: CatalogConfig) -> Self {
        Self::with_snapshot(CatalogSnapshot::new(), config)
    }

    /// Catalog seeded from an existing snapshot, bypassing write-path validation
    #[must_use]
    pub fn with_snapshot(snapshot: CatalogSnapshot, config: CatalogConfig) -> Self {
        Self {
            state: RwLock::new(Arc::new(snapshot)),
            config,
        }
    }

    /// Every write-time check against `catalog`, returning the id the draft resolves to
    fn check_draft(
        &self,
        draft: &RecipeDraft,
        catalog: &CatalogSnapshot,
    ) -> Result<Option<Uuid>, CatalogError> {
        check_recipe_rules(draft, catalog, self.config.max_ingredients_per_recipe)?;

        let by_product = catalog.get_recipe_by_product(draft.product_id).map(|r| r.id);
        let existing_id = match (draft.id, by_product) {
            (Some(requested), Some(current)) if requested != current => {
                return Err(CatalogError::Conflict {
                    message: format!(
                        "Product {} already has recipe {current}",
                        draft.product_id
                    ),
                });
            }
            (Some(requested), _) => catalog.get_recipe(requested).map(|recipe| recipe.id),
            (None, current) => current,
        };
        if let Some(requested) = draft.id {
            if let Some(stored) = catalog.get_recipe(requested) {
                if stored.product_id != draft.product_id {
                    return Err(CatalogError::Conflict {
                        message: format!(
                            "Recipe {requested} produces product {}, not {}",
                            stored.product_id, draft.product_id
                        ),
                    });
                }
            }
        }

        validate_draft(draft, catalog)?;
        Ok(existing_id)
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        Ok(Arc::clone(&*self.state.read().await))
    }

    async fn upsert_product(&self, product: Product) -> Result<Product, CatalogError> {
        check_product(&product)?;
        let mut state = self.state.write().await;
        let previous = Arc::make_mut(&mut state).insert_product(product.clone());
        drop(state);
        debug!(product_id = %product.id, replaced = previous.is_some(), "Product stored");
        Ok(product)
    }

    async fn save_recipe(&self, draft: RecipeDraft) -> Result<SavedRecipe, CatalogError> {
        let draft = draft.normalized();
        let mut state = self.state.write().await;

        let existing_id = match self.check_draft(&draft, &state) {
            Ok(id) => id,
            Err(error) => {
                warn!(product_id = %draft.product_id, %error, "Recipe rejected");
                return Err(error);
            }
        };
        let existing = existing_id.and_then(|id| state.get_recipe(id));

        let (id, version, version_bumped) = match existing {
            Some(current) if current.composition_differs(&draft) => {
                (current.id, current.version + 1, true)
            }
            Some(current) => (current.id, current.version, false),
            None => (draft.id.unwrap_or_else(Uuid::new_v4), 1, true),
        };
        let created = existing.is_none();

        let recipe = Recipe {
            id,
            product_id: draft.product_id,
            name: draft.name,
            yield_quantity: draft.yield_quantity,
            yield_unit: draft.yield_unit,
            version,
            ingredients: draft.ingredients,
            updated_at: Utc::now(),
        };
        Arc::make_mut(&mut state).insert_recipe(recipe.clone());
        drop(state);

        info!(
            recipe_id = %recipe.id,
            product_id = %recipe.product_id,
            version = recipe.version,
            created,
            "Recipe saved"
        );
        Ok(SavedRecipe {
            recipe,
            created,
            version_bumped,
        })
    }

    async fn validate_recipe(&self, draft: &RecipeDraft) -> Result<(), CatalogError> {
        let state = self.state.read().await;
        self.check_draft(draft, &state).map(|_| ())
    }

    async fn used_by(&self, product_id: Uuid) -> Result<Vec<Product>, CatalogError> {
        let snapshot = self.snapshot().await?;
        if snapshot.get_product(product_id).is_none() {
            return Err(CatalogError::ProductNotFound { product_id });
        }
        let graph = DependencyGraph::from_catalog(snapshot.as_ref());
        let mut users: Vec<Product> = graph
            .dependents(product_id)
            .into_iter()
            .filter_map(|id| snapshot.get_product(id).cloned())
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(users)
    }
}
