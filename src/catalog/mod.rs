// ABOUTME: Catalog store abstraction for products and recipes
// ABOUTME: Reads hand out immutable snapshots; writes validate rules and acyclicity atomically
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Catalog Store
//!
//! The engine reads the catalog through consistent [`CatalogSnapshot`]s. Writers
//! validate a recipe and publish it under the same lock, so no snapshot ever
//! contains a cyclic or half-written graph.

/// In-memory catalog implementation
pub mod memory;

use std::collections::BTreeSet;
use std::sync::Arc;

use recipe_calc_core::constants::catalog::MAX_NAME_LENGTH;
use recipe_calc_core::errors::CatalogError;
use recipe_calc_core::models::{CatalogReader, CatalogSnapshot, Product, Recipe, RecipeDraft};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

pub use memory::InMemoryCatalog;

/// Outcome of a recipe write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedRecipe {
    /// Recipe as stored
    pub recipe: Recipe,
    /// Whether the recipe did not exist before
    pub created: bool,
    /// Whether the write produced a new version
    pub version_bumped: bool,
}

/// Catalog store contract
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Consistent read-only view for one calculation
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backing store cannot be read
    async fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, CatalogError>;

    /// Look up a product
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if absent
    async fn get_product(&self, product_id: Uuid) -> Result<Product, CatalogError> {
        let snapshot = self.snapshot().await?;
        snapshot
            .get_product(product_id)
            .cloned()
            .ok_or(CatalogError::ProductNotFound { product_id })
    }

    /// Look up a recipe by id
    ///
    /// # Errors
    ///
    /// Returns `RecipeNotFound` if absent
    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Recipe, CatalogError> {
        let snapshot = self.snapshot().await?;
        snapshot
            .get_recipe(recipe_id)
            .cloned()
            .ok_or(CatalogError::RecipeNotFound { recipe_id })
    }

    /// Look up the recipe producing a product
    ///
    /// # Errors
    ///
    /// Returns `NoRecipeForProduct` if no recipe produces the product
    async fn get_recipe_by_product(&self, product_id: Uuid) -> Result<Recipe, CatalogError> {
        let snapshot = self.snapshot().await?;
        snapshot
            .get_recipe_by_product(product_id)
            .cloned()
            .ok_or(CatalogError::NoRecipeForProduct { product_id })
    }

    /// Current version of a recipe
    ///
    /// # Errors
    ///
    /// Returns `RecipeNotFound` if absent
    async fn get_recipe_version(&self, recipe_id: Uuid) -> Result<u64, CatalogError> {
        let snapshot = self.snapshot().await?;
        snapshot
            .get_recipe_version(recipe_id)
            .ok_or(CatalogError::RecipeNotFound { recipe_id })
    }

    /// Create or replace a product
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` for an empty or oversized name
    async fn upsert_product(&self, product: Product) -> Result<Product, CatalogError>;

    /// Validate and persist a recipe, bumping its version when the composition changes
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` listing every rule violation, `CycleDetected` with
    /// the offending path, or `Conflict` when ids disagree with stored data
    async fn save_recipe(&self, draft: RecipeDraft) -> Result<SavedRecipe, CatalogError>;

    /// Run every write-time check without persisting
    ///
    /// # Errors
    ///
    /// Same as [`Self::save_recipe`]
    async fn validate_recipe(&self, draft: &RecipeDraft) -> Result<(), CatalogError>;

    /// Products whose recipes use `product_id` directly
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if the product does not exist
    async fn used_by(&self, product_id: Uuid) -> Result<Vec<Product>, CatalogError>;
}

/// Check a product's own fields
///
/// # Errors
///
/// Returns `ValidationFailed` for an empty or oversized name
pub fn check_product(product: &Product) -> Result<(), CatalogError> {
    let mut errors = Vec::new();
    check_name(&product.name, "Product", &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::ValidationFailed { errors })
    }
}

/// Check every write-time rule except acyclicity, collecting all violations
///
/// # Errors
///
/// Returns `ValidationFailed` listing every violation found
pub fn check_recipe_rules<C>(
    draft: &RecipeDraft,
    catalog: &C,
    max_ingredients: usize,
) -> Result<(), CatalogError>
where
    C: CatalogReader + ?Sized,
{
    let mut errors = Vec::new();

    check_name(&draft.name, "Recipe", &mut errors);
    if catalog.get_product(draft.product_id).is_none() {
        errors.push(format!("Output product {} does not exist", draft.product_id));
    }
    if draft.yield_quantity <= Decimal::ZERO {
        errors.push(format!(
            "Yield quantity must be positive, got {}",
            draft.yield_quantity
        ));
    }
    if draft.ingredients.is_empty() {
        errors.push("Recipe must have at least one ingredient".to_owned());
    }
    if draft.ingredients.len() > max_ingredients {
        errors.push(format!(
            "Recipe has {} ingredients, at most {max_ingredients} allowed",
            draft.ingredients.len()
        ));
    }

    let mut orders = BTreeSet::new();
    for line in &draft.ingredients {
        if !orders.insert(line.order) {
            errors.push(format!("Duplicate ingredient order {}", line.order));
        }
        if line.quantity <= Decimal::ZERO {
            errors.push(format!(
                "Ingredient {} quantity must be positive, got {}",
                line.ingredient_product_id, line.quantity
            ));
        }
        if catalog.get_product(line.ingredient_product_id).is_none() {
            errors.push(format!(
                "Ingredient product {} does not exist",
                line.ingredient_product_id
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::ValidationFailed { errors })
    }
}

fn check_name(name: &str, what: &str, errors: &mut Vec<String>) {
    if name.trim().is_empty() {
        errors.push(format!("{what} name must not be empty"));
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.push(format!(
            "{what} name exceeds {MAX_NAME_LENGTH} characters"
        ));
    }
}
