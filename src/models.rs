// ABOUTME: Catalog data models re-exported from the core crate
// ABOUTME: Products, recipes, ingredient lines, and catalog snapshots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use recipe_calc_core::models::*;
