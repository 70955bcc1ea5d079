// ABOUTME: Unified error handling re-exported from the core crate
// ABOUTME: AppError, ErrorCode, and the calculation and catalog error taxonomies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use recipe_calc_core::errors::*;
