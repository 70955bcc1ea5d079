// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants organized by domain for the recipe calculation platform
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Cache-related constants (TTL, sizes, etc.)
pub mod cache;
/// Calculation defaults and hard limits
pub mod calculation;
/// Catalog write-path limits
pub mod catalog;

/// API endpoints
pub mod endpoints {
    /// Health check endpoint
    pub const HEALTH_CHECK: &str = "/health";
    /// Readiness endpoint
    pub const READY_CHECK: &str = "/ready";
    /// API base path
    pub const API_BASE: &str = "/api/v1";
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8083;
}

/// Batch execution limits
pub mod batch {
    /// Maximum number of requests accepted in one batch
    pub const MAX_BATCH_SIZE: usize = 50;
    /// Default number of batch items computed concurrently
    pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;
}

/// Calculation history retention and paging
pub mod history {
    /// Maximum history entries retained in memory (oldest dropped first)
    pub const DEFAULT_HISTORY_MAX_ENTRIES: usize = 10_000;
    /// Default page size for history queries
    pub const DEFAULT_HISTORY_LIMIT: usize = 50;
    /// Largest page size a history query may request
    pub const MAX_HISTORY_LIMIT: usize = 500;
}

/// Service names for structured logging
pub mod service_names {
    /// Main server service name
    pub const RECIPE_CALC_SERVER: &str = "recipe-calc-server";
}
