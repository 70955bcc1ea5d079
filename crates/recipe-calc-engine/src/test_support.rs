// ABOUTME: Catalog fixtures shared by the engine unit tests
// ABOUTME: Builds snapshots directly, bypassing write-path validation on purpose
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use chrono::Utc;
use recipe_calc_core::models::{
    CatalogSnapshot, Product, ProductKind, Recipe, RecipeIngredient, Unit,
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub const FLOUR: u128 = 1;
pub const SUGAR: u128 = 2;
pub const FILLING: u128 = 3;
pub const CAKE: u128 = 4;
pub const CAKE_RECIPE: u128 = 100;
pub const FILLING_RECIPE: u128 = 101;

pub fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

pub const fn id(value: u128) -> Uuid {
    Uuid::from_u128(value)
}

#[derive(Default)]
pub struct CatalogBuilder {
    snapshot: CatalogSnapshot,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(mut self, product: u128, name: &str, kind: ProductKind, unit: Unit) -> Self {
        self.snapshot
            .insert_product(Product::new(id(product), name, kind, unit));
        self
    }

    pub fn recipe(
        mut self,
        recipe: u128,
        product: u128,
        yield_quantity: &str,
        yield_unit: Unit,
        lines: &[(u128, &str, Unit)],
    ) -> Self {
        let ingredients = lines
            .iter()
            .enumerate()
            .map(|(index, (ingredient, quantity, unit))| RecipeIngredient {
                ingredient_product_id: id(*ingredient),
                quantity: dec(quantity),
                unit: *unit,
                order: u32::try_from(index).unwrap(),
            })
            .collect();
        self.snapshot.insert_recipe(Recipe {
            id: id(recipe),
            product_id: id(product),
            name: format!("recipe-{recipe}"),
            yield_quantity: dec(yield_quantity),
            yield_unit,
            version: 1,
            ingredients,
            updated_at: Utc::now(),
        });
        self
    }

    pub fn build(self) -> CatalogSnapshot {
        self.snapshot
    }
}

/// Cake yields 500 g from 200 g flour, 150 g sugar and 150 g filling;
/// filling yields 300 g from 200 g flour and 100 g sugar.
pub fn cake_catalog() -> CatalogSnapshot {
    CatalogBuilder::new()
        .product(FLOUR, "Flour", ProductKind::Standard, Unit::Gram)
        .product(SUGAR, "Sugar", ProductKind::Standard, Unit::Gram)
        .product(FILLING, "Filling", ProductKind::SemiProduct, Unit::Gram)
        .product(CAKE, "Cake", ProductKind::SemiProduct, Unit::Gram)
        .recipe(
            FILLING_RECIPE,
            FILLING,
            "300",
            Unit::Gram,
            &[(FLOUR, "200", Unit::Gram), (SUGAR, "100", Unit::Gram)],
        )
        .recipe(
            CAKE_RECIPE,
            CAKE,
            "500",
            Unit::Gram,
            &[
                (FLOUR, "200", Unit::Gram),
                (SUGAR, "150", Unit::Gram),
                (FILLING, "150", Unit::Gram),
            ],
        )
        .build()
}
