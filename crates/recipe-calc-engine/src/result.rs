// ABOUTME: Calculation result types: flat ingredient list, expansion tree, and metadata
// ABOUTME: Results are immutable once built and shared behind Arc by cache and history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use recipe_calc_core::models::{ProductKind, Unit};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregated quantity of one leaf product in the flattened output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedIngredient {
    /// Leaf product
    pub product_id: Uuid,
    /// Product name at calculation time
    pub product_name: String,
    /// Product kind (expandable kinds appear here only when truncated or recipe-less)
    pub kind: ProductKind,
    /// Sum of every contribution, rounded once
    pub calculated_quantity: Decimal,
    /// Unit of the quantity
    pub unit: Unit,
    /// Shallowest depth the product was reached at
    pub depth: u32,
}

/// One ingredient line in the expansion tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Product referenced by the line
    pub product_id: Uuid,
    /// Product name at calculation time
    pub product_name: String,
    /// Product kind
    pub kind: ProductKind,
    /// Scaled quantity of this line, rounded for display
    pub calculated_quantity: Decimal,
    /// Unit of the line
    pub unit: Unit,
    /// Line position within its recipe
    pub order: u32,
    /// Depth of the recipe owning this line, root lines are depth 0
    pub depth: u32,
    /// Whether the line was expanded into its own recipe
    pub expanded: bool,
    /// Whether expansion stopped here because of `max_depth`
    pub truncated: bool,
    /// Lines of the sub-recipe when expanded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_ingredients: Vec<Self>,
}

/// How a result was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationMetadata {
    /// Whether the tree was requested
    pub include_hierarchy: bool,
    /// Effective expansion depth
    pub max_depth: u32,
    /// Effective output precision
    pub precision: u32,
    /// Ingredient lines visited during expansion
    pub ingredient_count: usize,
    /// Sub-recipes expanded during the calculation
    pub expanded_recipes: usize,
    /// Version of the scaling algorithm
    pub algorithm_version: String,
}

/// Output of one scaling calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Scaled recipe
    pub recipe_id: Uuid,
    /// Recipe version the result was computed from
    pub recipe_version: u64,
    /// Output product of the recipe
    pub product_id: Uuid,
    /// Output product name
    pub product_name: String,
    /// Recipe yield quantity
    pub original_yield: Decimal,
    /// Recipe yield unit
    pub original_yield_unit: Unit,
    /// Requested quantity
    pub target_quantity: Decimal,
    /// Requested unit
    pub target_unit: Unit,
    /// `target_quantity / original_yield`, unrounded
    pub scale_factor: Decimal,
    /// Flattened leaf quantities in first-appearance order
    pub ingredients: Vec<CalculatedIngredient>,
    /// Expansion tree when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<Vec<HierarchyNode>>,
    /// Whether any expandable ingredient was left unexpanded at `max_depth`
    pub truncated: bool,
    /// Sum of flattened gram quantities
    pub total_weight: Decimal,
    /// Sum of flattened piece quantities
    pub total_pieces: Decimal,
    /// How the result was produced
    pub metadata: CalculationMetadata,
}

impl CalculationResult {
    /// Flattened entry for a product, if present
    #[must_use]
    pub fn ingredient(&self, product_id: Uuid) -> Option<&CalculatedIngredient> {
        self.ingredients
            .iter()
            .find(|ingredient| ingredient.product_id == product_id)
    }
}
