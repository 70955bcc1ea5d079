// ABOUTME: Unit tests for config environment functionality
// ABOUTME: Validates environment parsing, defaults, overrides, and rejection of bad values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::time::Duration;

use recipe_calc_server::config::environment::{Environment, ServerConfig};
use recipe_calc_server::errors::ErrorCode;
use rust_decimal::Decimal;
use serial_test::serial;

const VARIABLES: &[&str] = &[
    "HTTP_PORT",
    "HOST",
    "ENVIRONMENT",
    "REQUEST_TIMEOUT_SECS",
    "PRECISION_DECIMAL_PLACES",
    "MAX_PRECISION",
    "DEFAULT_MAX_DEPTH",
    "MAX_DEPTH_LIMIT",
    "MAX_INGREDIENTS_PER_CALCULATION",
    "MIN_SCALE_FACTOR",
    "MAX_SCALE_FACTOR",
    "ENABLE_RESULT_CACHING",
    "CALCULATION_CACHE_MAX_ENTRIES",
    "CALCULATION_CACHE_TTL_SECS",
    "CACHE_CLEANUP_INTERVAL_SECS",
    "ENABLE_HISTORY",
    "HISTORY_MAX_ENTRIES",
    "MAX_BATCH_SIZE",
    "BATCH_CONCURRENCY",
    "MAX_INGREDIENTS_PER_RECIPE",
];

fn clear_env() {
    for key in VARIABLES {
        env::remove_var(key);
    }
}

#[test]
fn test_environment_parsing() {
    assert_eq!(
        Environment::from_str_or_default("production"),
        Environment::Production
    );
    assert_eq!(Environment::from_str_or_default("PROD"), Environment::Production);
    assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
    assert_eq!(
        Environment::from_str_or_default("anything"),
        Environment::Development
    );
    assert!(Environment::Production.is_production());
    assert_eq!(Environment::Testing.to_string(), "testing");
}

#[test]
#[serial]
fn test_defaults_when_unset() {
    clear_env();
    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8083);
    assert_eq!(config.engine.default_precision, 3);
    assert_eq!(config.engine.max_precision, 6);
    assert_eq!(config.engine.default_max_depth, 5);
    assert_eq!(config.engine.max_depth_limit, 10);
    assert_eq!(config.engine.min_scale_factor, Some("0.001".parse::<Decimal>().unwrap()));
    assert_eq!(config.engine.max_scale_factor, Some(Decimal::from(1_000)));
    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl, Duration::from_secs(1_800));
    assert!(config.history.enabled);
    assert_eq!(config.batch.max_batch_size, 50);
    assert_eq!(config.catalog.max_ingredients_per_recipe, 200);
    assert!(config.summary().contains("Result Caching: Enabled"));
}

#[test]
#[serial]
fn test_overrides_are_applied() {
    clear_env();
    env::set_var("HTTP_PORT", "9090");
    env::set_var("ENVIRONMENT", "production");
    env::set_var("PRECISION_DECIMAL_PLACES", "2");
    env::set_var("MAX_SCALE_FACTOR", "250.5");
    env::set_var("ENABLE_RESULT_CACHING", "false");
    env::set_var("CALCULATION_CACHE_TTL_SECS", "60");
    env::set_var("BATCH_CONCURRENCY", "2");
    env::set_var("MAX_INGREDIENTS_PER_RECIPE", "");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 9090);
    assert!(config.environment.is_production());
    assert_eq!(config.engine.default_precision, 2);
    assert_eq!(config.engine.max_scale_factor, Some("250.5".parse::<Decimal>().unwrap()));
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.ttl, Duration::from_secs(60));
    assert_eq!(config.batch.concurrency, 2);
    // Empty values fall back to defaults
    assert_eq!(config.catalog.max_ingredients_per_recipe, 200);
}

#[test]
#[serial]
fn test_unparseable_value_is_rejected() {
    clear_env();
    env::set_var("DEFAULT_MAX_DEPTH", "deep");
    let error = ServerConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("DEFAULT_MAX_DEPTH"));
}

#[test]
#[serial]
fn test_inconsistent_limits_are_rejected() {
    clear_env();
    env::set_var("DEFAULT_MAX_DEPTH", "8");
    env::set_var("MAX_DEPTH_LIMIT", "4");
    let error = ServerConfig::from_env().unwrap_err();
    clear_env();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);

    let mut config = ServerConfig::default();
    config.engine.min_scale_factor = Some(Decimal::TEN);
    config.engine.max_scale_factor = Some(Decimal::ONE);
    assert!(config.validate().is_err());

    let mut config = ServerConfig::default();
    config.batch.max_batch_size = 0;
    assert!(config.validate().is_err());
}
