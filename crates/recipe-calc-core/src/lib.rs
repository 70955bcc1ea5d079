// ABOUTME: Core types and constants for the recipe hierarchy calculation engine
// ABOUTME: Foundation crate with error handling, catalog models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Recipe Calc Core
//!
//! Foundation crate providing shared types and constants for the recipe
//! calculation platform. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and domain-specific errors
//! - **constants**: Application-wide constants organized by domain
//! - **models**: Products, recipes, ingredient lines, and the immutable catalog snapshot

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and configuration values organized by domain
pub mod constants;

/// Catalog data models (Product, Recipe, `CatalogSnapshot`)
pub mod models;
