// ABOUTME: Immutable catalog snapshot and the read-only lookup trait
// ABOUTME: Calculations run against one snapshot so concurrent writes never tear a result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use uuid::Uuid;

use super::product::Product;
use super::recipe::Recipe;

/// Read-only catalog lookups used by the scaling engine and validator
pub trait CatalogReader: Send + Sync {
    /// Look up a product
    fn get_product(&self, product_id: Uuid) -> Option<&Product>;

    /// Look up a recipe by its id
    fn get_recipe(&self, recipe_id: Uuid) -> Option<&Recipe>;

    /// Look up the recipe producing a product
    fn get_recipe_by_product(&self, product_id: Uuid) -> Option<&Recipe>;

    /// Current version of a recipe
    fn get_recipe_version(&self, recipe_id: Uuid) -> Option<u64> {
        self.get_recipe(recipe_id).map(|recipe| recipe.version)
    }

    /// All recipes, ordered by recipe id
    fn recipes(&self) -> Box<dyn Iterator<Item = &Recipe> + '_>;
}

/// Point-in-time copy of every product and recipe
///
/// Uses ordered maps so iteration (and everything derived from it, such as
/// reported cycle paths) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: BTreeMap<Uuid, Product>,
    recipes: BTreeMap<Uuid, Recipe>,
    recipe_by_product: BTreeMap<Uuid, Uuid>,
}

impl CatalogSnapshot {
    /// Create an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product, returning the previous value
    pub fn insert_product(&mut self, product: Product) -> Option<Product> {
        self.products.insert(product.id, product)
    }

    /// Insert or replace a recipe without validation, returning the previous value
    ///
    /// The product index follows the recipe: if the replaced recipe produced a
    /// different product, that product no longer maps to it.
    pub fn insert_recipe(&mut self, recipe: Recipe) -> Option<Recipe> {
        let previous = self.recipes.insert(recipe.id, recipe.clone());
        if let Some(old) = &previous {
            if old.product_id != recipe.product_id
                && self.recipe_by_product.get(&old.product_id) == Some(&old.id)
            {
                self.recipe_by_product.remove(&old.product_id);
            }
        }
        self.recipe_by_product.insert(recipe.product_id, recipe.id);
        previous
    }

    /// All products, ordered by id
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Number of products
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Number of recipes
    #[must_use]
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}

impl CatalogReader for CatalogSnapshot {
    fn get_product(&self, product_id: Uuid) -> Option<&Product> {
        self.products.get(&product_id)
    }

    fn get_recipe(&self, recipe_id: Uuid) -> Option<&Recipe> {
        self.recipes.get(&recipe_id)
    }

    fn get_recipe_by_product(&self, product_id: Uuid) -> Option<&Recipe> {
        self.recipe_by_product
            .get(&product_id)
            .and_then(|recipe_id| self.recipes.get(recipe_id))
    }

    fn recipes(&self) -> Box<dyn Iterator<Item = &Recipe> + '_> {
        Box::new(self.recipes.values())
    }
}
