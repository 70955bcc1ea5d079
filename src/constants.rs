// ABOUTME: System-wide constants re-exported from the core crate
// ABOUTME: Calculation limits, cache defaults, endpoints, and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use recipe_calc_core::constants::*;
