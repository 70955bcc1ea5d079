// ABOUTME: Environment-based server configuration with typed sections and defaults
// ABOUTME: Parses ports, engine limits, cache, history, batch, and catalog settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use recipe_calc_core::constants::{
    batch::{DEFAULT_BATCH_CONCURRENCY, MAX_BATCH_SIZE},
    cache::{DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CLEANUP_INTERVAL_SECS, TTL_CALCULATION_SECS},
    calculation::{
        DEFAULT_MAX_DEPTH, DEFAULT_MAX_SCALE_FACTOR, DEFAULT_MIN_SCALE_FACTOR, DEFAULT_PRECISION,
        MAX_DEPTH_LIMIT, MAX_INGREDIENTS_PER_CALCULATION, MAX_PRECISION,
    },
    catalog::MAX_INGREDIENTS_PER_RECIPE,
    history::DEFAULT_HISTORY_MAX_ENTRIES,
    ports::DEFAULT_HTTP_PORT,
};
use recipe_calc_engine::EngineConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::CacheConfig;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// History recorder settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Record calculations at all
    pub enabled: bool,
    /// Entries retained before the oldest are dropped
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: DEFAULT_HISTORY_MAX_ENTRIES,
        }
    }
}

/// Batch coordinator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Largest accepted batch
    pub max_batch_size: usize,
    /// Batch items computed at the same time
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE,
            concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

/// Catalog write-path settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Maximum ingredient lines per recipe
    pub max_ingredients_per_recipe: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_ingredients_per_recipe: MAX_INGREDIENTS_PER_RECIPE,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Scaling engine limits
    pub engine: EngineConfig,
    /// Calculation cache settings
    pub cache: CacheConfig,
    /// History settings
    pub history: HistoryConfig,
    /// Batch settings
    pub batch: BatchConfig,
    /// Catalog settings
    pub catalog: CatalogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            host: "0.0.0.0".to_owned(),
            environment: Environment::Development,
            request_timeout: Duration::from_secs(30),
            engine: EngineConfig::default(),
            cache: CacheConfig::default(),
            history: HistoryConfig::default(),
            batch: BatchConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_INVALID` error when a variable is set but cannot be parsed,
    /// or when the resulting limits are inconsistent
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: env_parse("HTTP_PORT", DEFAULT_HTTP_PORT)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_owned()),
            environment: Environment::from_str_or_default(
                &env::var("ENVIRONMENT").unwrap_or_default(),
            ),
            request_timeout: Duration::from_secs(env_parse("REQUEST_TIMEOUT_SECS", 30_u64)?),
            engine: EngineConfig {
                default_precision: env_parse("PRECISION_DECIMAL_PLACES", DEFAULT_PRECISION)?,
                max_precision: env_parse("MAX_PRECISION", MAX_PRECISION)?,
                default_max_depth: env_parse("DEFAULT_MAX_DEPTH", DEFAULT_MAX_DEPTH)?,
                max_depth_limit: env_parse("MAX_DEPTH_LIMIT", MAX_DEPTH_LIMIT)?,
                max_ingredients: env_parse(
                    "MAX_INGREDIENTS_PER_CALCULATION",
                    MAX_INGREDIENTS_PER_CALCULATION,
                )?,
                min_scale_factor: Some(env_parse::<Decimal>(
                    "MIN_SCALE_FACTOR",
                    DEFAULT_MIN_SCALE_FACTOR,
                )?),
                max_scale_factor: Some(env_parse::<Decimal>(
                    "MAX_SCALE_FACTOR",
                    DEFAULT_MAX_SCALE_FACTOR,
                )?),
            },
            cache: CacheConfig {
                enabled: env_parse("ENABLE_RESULT_CACHING", true)?,
                max_entries: env_parse("CALCULATION_CACHE_MAX_ENTRIES", DEFAULT_CACHE_MAX_ENTRIES)?,
                ttl: Duration::from_secs(env_parse(
                    "CALCULATION_CACHE_TTL_SECS",
                    TTL_CALCULATION_SECS,
                )?),
                cleanup_interval: Duration::from_secs(env_parse(
                    "CACHE_CLEANUP_INTERVAL_SECS",
                    DEFAULT_CLEANUP_INTERVAL_SECS,
                )?),
                enable_background_cleanup: true,
            },
            history: HistoryConfig {
                enabled: env_parse("ENABLE_HISTORY", true)?,
                max_entries: env_parse("HISTORY_MAX_ENTRIES", DEFAULT_HISTORY_MAX_ENTRIES)?,
            },
            batch: BatchConfig {
                max_batch_size: env_parse("MAX_BATCH_SIZE", MAX_BATCH_SIZE)?,
                concurrency: env_parse("BATCH_CONCURRENCY", DEFAULT_BATCH_CONCURRENCY)?,
            },
            catalog: CatalogConfig {
                max_ingredients_per_recipe: env_parse(
                    "MAX_INGREDIENTS_PER_RECIPE",
                    MAX_INGREDIENTS_PER_RECIPE,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_INVALID` error describing the first inconsistency
    pub fn validate(&self) -> AppResult<()> {
        let engine = &self.engine;
        if engine.default_precision > engine.max_precision {
            return Err(invalid(format!(
                "PRECISION_DECIMAL_PLACES ({}) exceeds MAX_PRECISION ({})",
                engine.default_precision, engine.max_precision
            )));
        }
        if engine.default_max_depth > engine.max_depth_limit {
            return Err(invalid(format!(
                "DEFAULT_MAX_DEPTH ({}) exceeds MAX_DEPTH_LIMIT ({})",
                engine.default_max_depth, engine.max_depth_limit
            )));
        }
        if let (Some(min), Some(max)) = (engine.min_scale_factor, engine.max_scale_factor) {
            if min > max {
                return Err(invalid(format!(
                    "MIN_SCALE_FACTOR ({min}) exceeds MAX_SCALE_FACTOR ({max})"
                )));
            }
        }
        if self.batch.max_batch_size == 0 || self.batch.concurrency == 0 {
            return Err(invalid("MAX_BATCH_SIZE and BATCH_CONCURRENCY must be positive"));
        }
        Ok(())
    }

    /// Human readable configuration summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Recipe Calculation Server Configuration:\n\
             - Listen: {}:{}\n\
             - Environment: {}\n\
             - Precision: {} (max {})\n\
             - Max Depth: {} (limit {})\n\
             - Result Caching: {} ({} entries, ttl {}s)\n\
             - History: {} ({} entries)\n\
             - Batch: max {} items, concurrency {}",
            self.host,
            self.http_port,
            self.environment,
            self.engine.default_precision,
            self.engine.max_precision,
            self.engine.default_max_depth,
            self.engine.max_depth_limit,
            if self.cache.enabled { "Enabled" } else { "Disabled" },
            self.cache.max_entries,
            self.cache.ttl.as_secs(),
            if self.history.enabled { "Enabled" } else { "Disabled" },
            self.history.max_entries,
            self.batch.max_batch_size,
            self.batch.concurrency,
        )
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::new(ErrorCode::ConfigInvalid, message)
}

/// Parse an environment variable, falling back to `default` when unset
fn env_parse<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    env_parse_optional(key).map(|value| value.unwrap_or(default))
}

/// Parse an optional environment variable; empty values count as unset
fn env_parse_optional<T>(key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| invalid(format!("Invalid {key} value '{raw}': {e}"))),
        _ => Ok(None),
    }
}
