// ABOUTME: Recipe model with ordered ingredient lines and version counter
// ABOUTME: Includes the draft type accepted by the catalog write path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::Unit;

/// One line of a recipe's bill of materials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Product consumed by this line
    pub ingredient_product_id: Uuid,
    /// Quantity per one yield of the parent recipe
    pub quantity: Decimal,
    /// Unit of the quantity
    pub unit: Unit,
    /// Position of the line, unique within the recipe
    pub order: u32,
}

/// Recipe producing one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe identifier
    pub id: Uuid,
    /// Product this recipe produces
    pub product_id: Uuid,
    /// Display name
    pub name: String,
    /// Quantity produced by one execution of the recipe
    pub yield_quantity: Decimal,
    /// Unit of the yield
    pub yield_unit: Unit,
    /// Incremented whenever ingredients or yield change
    pub version: u64,
    /// Ingredient lines
    pub ingredients: Vec<RecipeIngredient>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Ingredient lines sorted by their `order` field
    #[must_use]
    pub fn ordered_ingredients(&self) -> Vec<&RecipeIngredient> {
        let mut lines: Vec<&RecipeIngredient> = self.ingredients.iter().collect();
        lines.sort_by_key(|line| line.order);
        lines
    }

    /// Product ids referenced by this recipe's ingredient lines
    pub fn ingredient_product_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.ingredients
            .iter()
            .map(|line| line.ingredient_product_id)
    }

    /// Whether the draft changes anything that affects calculated quantities
    #[must_use]
    pub fn composition_differs(&self, draft: &RecipeDraft) -> bool {
        if self.yield_quantity != draft.yield_quantity || self.yield_unit != draft.yield_unit {
            return true;
        }
        let current = self.ordered_ingredients();
        let mut proposed: Vec<&RecipeIngredient> = draft.ingredients.iter().collect();
        proposed.sort_by_key(|line| line.order);
        current.len() != proposed.len() || current.iter().zip(&proposed).any(|(a, b)| a != b)
    }
}

/// Recipe as submitted for creation or update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    /// Existing recipe id to update, or a client-chosen id for a new recipe
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Product the recipe produces
    pub product_id: Uuid,
    /// Display name
    pub name: String,
    /// Quantity produced by one execution
    pub yield_quantity: Decimal,
    /// Unit of the yield
    pub yield_unit: Unit,
    /// Ingredient lines
    pub ingredients: Vec<RecipeIngredient>,
}

impl RecipeDraft {
    /// Strip trailing zeros from the yield and every line quantity
    ///
    /// `Decimal` equality ignores scale, so `500` and `500.00` compare equal but
    /// serialize differently. Stored recipes always carry the normalized form.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.yield_quantity = self.yield_quantity.normalize();
        for line in &mut self.ingredients {
            line.quantity = line.quantity.normalize();
        }
        self
    }
}
