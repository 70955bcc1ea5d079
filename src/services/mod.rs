// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Calculation orchestration, batch coordination, and catalog maintenance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services hold the business rules; route handlers only translate HTTP to service
//! calls and errors back to responses.

/// Independent concurrent calculations with order-preserving results
pub mod batch;

/// Snapshot, fingerprint, cache, engine, and history orchestration
pub mod calculation;

/// Product and recipe writes, dry-run validation, where-used, and audit
pub mod recipes;

pub use batch::{BatchCoordinator, BatchItem, BatchRequest, BatchResult, BatchSummary};
pub use calculation::{CalculationOutcome, CalculationService};
pub use recipes::RecipeService;
