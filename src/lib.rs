// ABOUTME: Main library entry point for the recipe hierarchy calculation server
// ABOUTME: Exposes catalog storage, cached calculations, batch execution, and the HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Recipe Calc Server
//!
//! Scales nested recipes (bills of materials) to a target quantity. Semi-products
//! expand into their own recipes, quantities are aggregated per raw ingredient, and
//! every write to the catalog is checked for dependency cycles.
//!
//! ## Architecture
//!
//! - **Engine** (`recipe-calc-engine`): synchronous expansion, cycle validation, fingerprints
//! - **Catalog**: versioned product and recipe store publishing immutable snapshots
//! - **Cache**: LRU result cache keyed by fingerprint with single-flight computation
//! - **Services**: calculation, batch, and catalog maintenance orchestration
//! - **Routes**: Axum HTTP handlers delegating to services
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use recipe_calc_server::config::environment::ServerConfig;
//! use recipe_calc_server::resources::ServerResources;
//! use recipe_calc_server::server::ServerLifecycle;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::new(config));
//!     ServerLifecycle::new(resources).run().await
//! }
//! ```

/// Calculation result cache with request coalescing
pub mod cache;
/// Versioned product and recipe storage
pub mod catalog;
/// Environment-driven server configuration
pub mod config;
/// Application constants
pub mod constants;
/// Error types and HTTP mapping
pub mod errors;
/// Bounded calculation history
pub mod history;
/// Structured logging setup
pub mod logging;
/// Domain models
pub mod models;
/// Shared resources wired at startup
pub mod resources;
/// HTTP routes
pub mod routes;
/// HTTP server lifecycle
pub mod server;
/// Calculation, batch, and catalog services
pub mod services;
