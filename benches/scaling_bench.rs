// ABOUTME: Criterion benchmarks for recipe expansion, fingerprinting, and cached calculations
// ABOUTME: Measures deep chains, wide recipes, cycle audits, and the cache hit path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the calculation engine.
//!
//! Catalogs are built directly as snapshots so the shapes can exceed write-path limits.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs
)]

use std::sync::Arc;

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use recipe_calc_engine::{
    CalculationRequest, DependencyGraph, EngineConfig, Fingerprint, ScalingEngine,
};
use recipe_calc_server::catalog::{CatalogStore, InMemoryCatalog};
use recipe_calc_server::config::environment::ServerConfig;
use recipe_calc_server::config::CatalogConfig;
use recipe_calc_server::models::{
    CatalogSnapshot, Product, ProductKind, Recipe, RecipeIngredient, Unit,
};
use recipe_calc_server::resources::ServerResources;
use rust_decimal::Decimal;
use tokio::runtime::Runtime;
use uuid::Uuid;

fn product_id(n: u32) -> Uuid {
    Uuid::from_u128(u128::from(n) + 1)
}

fn recipe_id(n: u32) -> Uuid {
    Uuid::from_u128(u128::from(n) + 1_000_000)
}

fn recipe(n: u32, lines: Vec<RecipeIngredient>) -> Recipe {
    Recipe {
        id: recipe_id(n),
        product_id: product_id(n),
        name: format!("recipe-{n}"),
        yield_quantity: Decimal::ONE_HUNDRED,
        yield_unit: Unit::Gram,
        version: 1,
        ingredients: lines,
        updated_at: Utc::now(),
    }
}

fn line(product: u32, order: u32) -> RecipeIngredient {
    RecipeIngredient {
        ingredient_product_id: product_id(product),
        quantity: Decimal::new(333, 1),
        unit: Unit::Gram,
        order,
    }
}

/// Product 0 consumes 1, which consumes 2, and so on; every level also uses salt
fn deep_chain(depth: u32) -> CatalogSnapshot {
    let salt = depth + 1;
    let mut catalog = CatalogSnapshot::new();
    catalog.insert_product(Product::new(
        product_id(salt),
        "Salt",
        ProductKind::Standard,
        Unit::Gram,
    ));
    for level in 0..=depth {
        let kind = if level == depth {
            ProductKind::Standard
        } else {
            ProductKind::SemiProduct
        };
        catalog.insert_product(Product::new(
            product_id(level),
            format!("Level {level}"),
            kind,
            Unit::Gram,
        ));
        if level < depth {
            catalog.insert_recipe(recipe(level, vec![line(level + 1, 0), line(salt, 1)]));
        }
    }
    catalog
}

/// Product 0 consumes `width` semi-products, each made of two shared raw materials
fn wide_recipe(width: u32) -> CatalogSnapshot {
    let flour = width + 1;
    let water = width + 2;
    let mut catalog = CatalogSnapshot::new();
    for (id, name) in [(flour, "Flour"), (water, "Water")] {
        catalog.insert_product(Product::new(
            product_id(id),
            name,
            ProductKind::Standard,
            Unit::Gram,
        ));
    }
    catalog.insert_product(Product::new(
        product_id(0),
        "Platter",
        ProductKind::Kit,
        Unit::Gram,
    ));
    let mut root_lines = Vec::new();
    for n in 1..=width {
        catalog.insert_product(Product::new(
            product_id(n),
            format!("Component {n}"),
            ProductKind::SemiProduct,
            Unit::Gram,
        ));
        catalog.insert_recipe(recipe(n, vec![line(flour, 0), line(water, 1)]));
        root_lines.push(line(n, n));
    }
    catalog.insert_recipe(recipe(0, root_lines));
    catalog
}

fn unbounded_engine() -> ScalingEngine {
    ScalingEngine::new(EngineConfig {
        max_ingredients: 1_000_000,
        ..EngineConfig::default()
    })
}

fn bench_deep_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_chain");
    let engine = unbounded_engine();

    for depth in [2_u32, 5, 10] {
        let catalog = deep_chain(depth);
        let request =
            CalculationRequest::new(recipe_id(0), Decimal::from(2_500), Unit::Gram)
                .with_max_depth(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| black_box(engine.calculate_request(&catalog, &request).unwrap()));
        });
    }

    group.finish();
}

fn bench_wide_recipe(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_recipe");
    let engine = unbounded_engine();

    for width in [10_u32, 100, 1_000] {
        let catalog = wide_recipe(width);
        group.throughput(Throughput::Elements(u64::from(width)));

        let flat = CalculationRequest::new(recipe_id(0), Decimal::from(1_000), Unit::Gram)
            .with_hierarchy(false);
        group.bench_with_input(BenchmarkId::new("flat", width), &width, |b, _| {
            b.iter(|| black_box(engine.calculate_request(&catalog, &flat).unwrap()));
        });

        let tree = flat.clone().with_hierarchy(true);
        group.bench_with_input(BenchmarkId::new("hierarchy", width), &width, |b, _| {
            b.iter(|| black_box(engine.calculate_request(&catalog, &tree).unwrap()));
        });
    }

    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let engine = unbounded_engine();
    let catalog = wide_recipe(100);
    let request = engine
        .resolve(&CalculationRequest::new(recipe_id(0), Decimal::from(1_000), Unit::Gram))
        .unwrap();

    c.bench_function("fingerprint_wide_100", |b| {
        b.iter(|| black_box(Fingerprint::compute(&catalog, &request).unwrap()));
    });
}

fn bench_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("audit");

    for width in [100_u32, 1_000] {
        let catalog = wide_recipe(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| {
                let graph = DependencyGraph::from_catalog(&catalog);
                black_box(graph.audit())
            });
        });
    }

    group.finish();
}

fn bench_cached_calculation(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut config = ServerConfig::default();
    config.cache.enable_background_cleanup = false;
    config.history.enabled = false;

    let resources = rt.block_on(async {
        let catalog: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalog::with_snapshot(
            wide_recipe(100),
            CatalogConfig::default(),
        ));
        Arc::new(ServerResources::with_catalog(config, catalog))
    });
    let request = CalculationRequest::new(recipe_id(0), Decimal::from(1_000), Unit::Gram);
    rt.block_on(resources.calculations.calculate(&request)).unwrap();

    c.bench_function("calculate_cache_hit_wide_100", |b| {
        b.to_async(&rt).iter(|| {
            let resources = Arc::clone(&resources);
            let request = request.clone();
            async move { black_box(resources.calculations.calculate(&request).await.unwrap()) }
        });
    });
}

criterion_group!(
    benches,
    bench_deep_chain,
    bench_wide_recipe,
    bench_fingerprint,
    bench_audit,
    bench_cached_calculation,
);
criterion_main!(benches);
