// ABOUTME: Half-to-even rounding of output quantities
// ABOUTME: Applied only when quantities leave the engine, never to scale factors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to `precision` decimal places using banker's rounding
///
/// Trailing zeros are stripped so equal quantities always render identically.
#[must_use]
pub fn round_quantity(value: Decimal, precision: u32) -> Decimal {
    value
        .round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven)
        .normalize()
}
