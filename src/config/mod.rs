// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Loads engine limits, cache, history, batch, and network settings from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the recipe calculation server
//!
//! All configuration comes from environment variables; see
//! [`environment::ServerConfig::from_env`] for the full list and defaults.

/// Environment and server configuration
pub mod environment;

pub use environment::{BatchConfig, CatalogConfig, Environment, HistoryConfig, ServerConfig};
