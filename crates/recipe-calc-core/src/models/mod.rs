// ABOUTME: Catalog data models shared by the engine and the server
// ABOUTME: Products, recipes, ingredient lines, and immutable catalog snapshots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Immutable catalog snapshot and the read trait the engine consumes
pub mod catalog;
/// Product, product kind, and measurement unit
pub mod product;
/// Recipe, ingredient line, and write-path draft
pub mod recipe;

pub use catalog::{CatalogReader, CatalogSnapshot};
pub use product::{Product, ProductKind, Unit};
pub use recipe::{Recipe, RecipeDraft, RecipeIngredient};
