// ABOUTME: Recipe hierarchy engine crate root with module declarations and re-exports
// ABOUTME: Scaling, cycle validation, and fingerprinting over immutable catalog snapshots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Recipe Calc Engine
//!
//! Synchronous algorithms behind the calculation service. Nothing in this crate
//! performs I/O: every operation reads from a [`CatalogReader`] snapshot supplied by
//! the caller, which keeps results deterministic and makes the engine safe to call
//! from blocking worker threads.
//!
//! - [`graph`]: arena dependency graph, write-time cycle validation, parallel audit
//! - [`scaling`]: iterative hierarchy expansion with half-even rounding
//! - [`fingerprint`]: cache keys derived from the request and its dependency versions
//!
//! [`CatalogReader`]: recipe_calc_core::models::CatalogReader

/// Engine limits and defaults
pub mod config;
/// Cache fingerprint derivation
pub mod fingerprint;
/// Dependency graph and cycle validation
pub mod graph;
/// Calculation request types
pub mod request;
/// Calculation result types
pub mod result;
/// Decimal rounding helpers
pub mod rounding;
/// Hierarchy expansion
pub mod scaling;

#[cfg(test)]
mod test_support;

pub use config::EngineConfig;
pub use fingerprint::Fingerprint;
pub use graph::{CycleReport, DependencyGraph};
pub use request::{CalculationOptions, CalculationRequest, ResolvedRequest};
pub use result::{CalculatedIngredient, CalculationMetadata, CalculationResult, HierarchyNode};
pub use scaling::ScalingEngine;
