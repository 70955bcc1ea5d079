// ABOUTME: Calculation request types as received from callers and after resolution
// ABOUTME: Resolution fills defaults and validates precision, depth, and quantity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use recipe_calc_core::models::Unit;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const fn default_include_hierarchy() -> bool {
    true
}

/// Optional knobs of a calculation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationOptions {
    /// Maximum expansion depth, engine default when absent
    #[serde(default)]
    pub max_depth: Option<u32>,
    /// Decimal places of output quantities, engine default when absent
    #[serde(default)]
    pub precision: Option<u32>,
    /// Whether to return the expansion tree alongside the flat list
    #[serde(default = "default_include_hierarchy")]
    pub include_hierarchy: bool,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            precision: None,
            include_hierarchy: true,
        }
    }
}

/// Request to scale a recipe to a target quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Recipe to scale
    pub recipe_id: Uuid,
    /// Desired output quantity
    pub target_quantity: Decimal,
    /// Unit of the desired quantity, must match the recipe yield unit
    pub target_unit: Unit,
    /// Optional knobs
    #[serde(default)]
    pub options: CalculationOptions,
}

impl CalculationRequest {
    /// Request with default options
    #[must_use]
    pub fn new(recipe_id: Uuid, target_quantity: Decimal, target_unit: Unit) -> Self {
        Self {
            recipe_id,
            target_quantity,
            target_unit,
            options: CalculationOptions::default(),
        }
    }

    /// Override the maximum expansion depth
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.options.max_depth = Some(max_depth);
        self
    }

    /// Override the output precision
    #[must_use]
    pub const fn with_precision(mut self, precision: u32) -> Self {
        self.options.precision = Some(precision);
        self
    }

    /// Toggle the hierarchy tree in the result
    #[must_use]
    pub const fn with_hierarchy(mut self, include_hierarchy: bool) -> Self {
        self.options.include_hierarchy = include_hierarchy;
        self
    }
}

/// Request with every default applied and every limit checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRequest {
    /// Recipe to scale
    pub recipe_id: Uuid,
    /// Desired output quantity, strictly positive
    pub target_quantity: Decimal,
    /// Unit of the desired quantity
    pub target_unit: Unit,
    /// Effective expansion depth
    pub max_depth: u32,
    /// Effective output precision
    pub precision: u32,
    /// Whether the tree is built
    pub include_hierarchy: bool,
}
