// ABOUTME: Calculation defaults and hard limits for hierarchy expansion
// ABOUTME: Precision, depth, ingredient budget, and algorithm version constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use rust_decimal::Decimal;

/// Decimal places used when a request does not specify precision
pub const DEFAULT_PRECISION: u32 = 3;

/// Largest precision a request may ask for
pub const MAX_PRECISION: u32 = 6;

/// Expansion depth used when a request does not specify one
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Largest expansion depth a request may ask for
pub const MAX_DEPTH_LIMIT: u32 = 10;

/// Maximum ingredient lines visited by one calculation
pub const MAX_INGREDIENTS_PER_CALCULATION: usize = 1_000;

/// Smallest accepted root scale factor by default (0.001)
pub const DEFAULT_MIN_SCALE_FACTOR: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Largest accepted root scale factor by default (1000)
pub const DEFAULT_MAX_SCALE_FACTOR: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

/// Version tag of the scaling algorithm, part of every cache fingerprint
pub const ALGORITHM_VERSION: &str = "v1.0";
