// ABOUTME: Cache-related constants for TTL, capacity, and cleanup intervals
// ABOUTME: Defaults for the in-memory calculation result cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Default maximum cache entries for in-memory cache
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Default cleanup interval in seconds for expired entries
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300; // 5 minutes

/// Calculation result TTL (30 minutes)
pub const TTL_CALCULATION_SECS: u64 = 1_800;
