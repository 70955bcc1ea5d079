// ABOUTME: Engine limits and defaults applied when resolving calculation requests
// ABOUTME: Precision, depth, ingredient budget, and scale factor bounds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use recipe_calc_core::constants::calculation::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_SCALE_FACTOR, DEFAULT_MIN_SCALE_FACTOR, DEFAULT_PRECISION,
    MAX_DEPTH_LIMIT, MAX_INGREDIENTS_PER_CALCULATION, MAX_PRECISION,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Limits enforced by the scaling engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Decimal places used when a request omits precision
    pub default_precision: u32,
    /// Largest precision a request may ask for
    pub max_precision: u32,
    /// Depth used when a request omits `max_depth`
    pub default_max_depth: u32,
    /// Largest `max_depth` a request may ask for
    pub max_depth_limit: u32,
    /// Maximum ingredient lines visited by one calculation
    pub max_ingredients: usize,
    /// Smallest accepted root scale factor, unbounded when `None`
    pub min_scale_factor: Option<Decimal>,
    /// Largest accepted root scale factor, unbounded when `None`
    pub max_scale_factor: Option<Decimal>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_precision: DEFAULT_PRECISION,
            max_precision: MAX_PRECISION,
            default_max_depth: DEFAULT_MAX_DEPTH,
            max_depth_limit: MAX_DEPTH_LIMIT,
            max_ingredients: MAX_INGREDIENTS_PER_CALCULATION,
            min_scale_factor: Some(DEFAULT_MIN_SCALE_FACTOR),
            max_scale_factor: Some(DEFAULT_MAX_SCALE_FACTOR),
        }
    }
}
