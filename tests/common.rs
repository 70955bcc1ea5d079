// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, test configuration, and the cake catalog fixture
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `recipe_calc_server`
//!
//! The cake fixture goes through the regular write path, so every recipe in it has
//! passed rule and cycle validation.

use anyhow::Result;
use recipe_calc_server::{
    config::environment::ServerConfig,
    models::{Product, ProductKind, RecipeDraft, RecipeIngredient, Unit},
    resources::ServerResources,
    services::RecipeService,
};
use rust_decimal::Decimal;
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Parse a decimal literal
pub fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

/// Default configuration without the background cleanup task
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.cache.enable_background_cleanup = false;
    config
}

/// Ids of the cake catalog
#[derive(Debug, Clone, Copy)]
pub struct CakeFixture {
    pub flour: Uuid,
    pub sugar: Uuid,
    pub filling: Uuid,
    pub cake: Uuid,
    pub filling_recipe: Uuid,
    pub cake_recipe: Uuid,
}

/// Build a recipe draft; lines are numbered in the order given
pub fn draft(
    product_id: Uuid,
    name: &str,
    yield_quantity: &str,
    yield_unit: Unit,
    lines: &[(Uuid, &str, Unit)],
) -> RecipeDraft {
    RecipeDraft {
        id: None,
        product_id,
        name: name.to_owned(),
        yield_quantity: dec(yield_quantity),
        yield_unit,
        ingredients: lines
            .iter()
            .zip(1_u32..)
            .map(|((ingredient, quantity, unit), order)| RecipeIngredient {
                ingredient_product_id: *ingredient,
                quantity: dec(quantity),
                unit: *unit,
                order,
            })
            .collect(),
    }
}

/// Create a product with a fresh id
pub async fn add_product(
    recipes: &RecipeService,
    name: &str,
    kind: ProductKind,
    unit: Unit,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    recipes
        .upsert_product(Product::new(id, name, kind, unit))
        .await?;
    Ok(id)
}

/// Cake yields 500 g from 200 g flour, 150 g sugar and 150 g filling;
/// filling yields 300 g from 200 g flour and 100 g sugar.
pub async fn seed_cake(recipes: &RecipeService) -> Result<CakeFixture> {
    let flour = add_product(recipes, "Flour", ProductKind::Standard, Unit::Gram).await?;
    let sugar = add_product(recipes, "Sugar", ProductKind::Standard, Unit::Gram).await?;
    let filling = add_product(recipes, "Filling", ProductKind::SemiProduct, Unit::Gram).await?;
    let cake = add_product(recipes, "Cake", ProductKind::SemiProduct, Unit::Gram).await?;

    let filling_recipe = recipes
        .save_recipe(draft(
            filling,
            "Filling",
            "300",
            Unit::Gram,
            &[(flour, "200", Unit::Gram), (sugar, "100", Unit::Gram)],
        ))
        .await?
        .recipe
        .id;
    let cake_recipe = recipes
        .save_recipe(draft(
            cake,
            "Cake",
            "500",
            Unit::Gram,
            &[
                (flour, "200", Unit::Gram),
                (sugar, "150", Unit::Gram),
                (filling, "150", Unit::Gram),
            ],
        ))
        .await?
        .recipe
        .id;

    Ok(CakeFixture {
        flour,
        sugar,
        filling,
        cake,
        filling_recipe,
        cake_recipe,
    })
}

/// Server resources over the given configuration with the cake catalog loaded
pub async fn create_resources_with(config: ServerConfig) -> Result<(Arc<ServerResources>, CakeFixture)> {
    init_test_logging();
    let resources = Arc::new(ServerResources::new(config));
    let cake = seed_cake(&resources.recipes).await?;
    Ok((resources, cake))
}

/// Server resources over the test configuration with the cake catalog loaded
pub async fn create_test_resources() -> Result<(Arc<ServerResources>, CakeFixture)> {
    create_resources_with(test_config()).await
}
