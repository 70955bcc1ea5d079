// ABOUTME: Server binary for the recipe hierarchy calculation API
// ABOUTME: Loads configuration from the environment, wires resources, and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recipe Calc Server Binary
//!
//! Starts the calculation API over an in-memory catalog. `--seed-demo` loads a small
//! bakery catalog through the regular write path so the API can be tried immediately.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use recipe_calc_server::{
    config::environment::ServerConfig,
    constants::endpoints::API_BASE,
    logging,
    models::{Product, ProductKind, RecipeDraft, RecipeIngredient, Unit},
    resources::ServerResources,
    server::ServerLifecycle,
    services::RecipeService,
};
use rust_decimal::Decimal;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "recipe-calc-server")]
#[command(about = "Recipe hierarchy calculation API - scales nested recipes with cycle protection")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind address
    #[arg(long)]
    host: Option<String>,

    /// Load the demo bakery catalog at startup
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Container entrypoints may pass arguments clap does not know about
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using default configuration");
            Args {
                http_port: None,
                host: None,
                seed_demo: false,
            }
        }
    };

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    logging::init_from_env()?;

    info!("Starting Recipe Calculation Server");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::new(config));

    if args.seed_demo {
        seed_demo_catalog(&resources.recipes).await?;
    }

    display_available_endpoints(&resources.config);

    if let Err(e) = ServerLifecycle::new(resources).run().await {
        error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Flour and sugar feed a filling; the cake consumes all three
async fn seed_demo_catalog(recipes: &RecipeService) -> Result<()> {
    let flour = Uuid::new_v4();
    let sugar = Uuid::new_v4();
    let filling = Uuid::new_v4();
    let cake = Uuid::new_v4();

    for (id, name, kind) in [
        (flour, "Flour", ProductKind::Standard),
        (sugar, "Sugar", ProductKind::Standard),
        (filling, "Filling", ProductKind::SemiProduct),
        (cake, "Cake", ProductKind::SemiProduct),
    ] {
        recipes
            .upsert_product(Product::new(id, name, kind, Unit::Gram))
            .await?;
    }

    let filling_recipe = recipes
        .save_recipe(demo_draft(
            filling,
            "Filling",
            300,
            &[(flour, 200), (sugar, 100)],
        ))
        .await?;
    let cake_recipe = recipes
        .save_recipe(demo_draft(
            cake,
            "Cake",
            500,
            &[(flour, 200), (sugar, 150), (filling, 150)],
        ))
        .await?;

    info!(
        filling_recipe = %filling_recipe.recipe.id,
        cake_recipe = %cake_recipe.recipe.id,
        "Demo catalog seeded"
    );
    Ok(())
}

fn demo_draft(product_id: Uuid, name: &str, yield_grams: i64, lines: &[(Uuid, i64)]) -> RecipeDraft {
    RecipeDraft {
        id: None,
        product_id,
        name: name.to_owned(),
        yield_quantity: Decimal::from(yield_grams),
        yield_unit: Unit::Gram,
        ingredients: lines
            .iter()
            .zip(1_u32..)
            .map(|((ingredient, grams), order)| RecipeIngredient {
                ingredient_product_id: *ingredient,
                quantity: Decimal::from(*grams),
                unit: Unit::Gram,
                order,
            })
            .collect(),
    }
}

fn display_available_endpoints(config: &ServerConfig) {
    let host = &config.host;
    let port = config.http_port;

    info!("=== Available API Endpoints ===");
    display_health_endpoints(host, port);
    display_calculation_endpoints(host, port);
    display_catalog_endpoints(host, port);
    info!("=== End of Endpoint List ===");
}

fn display_health_endpoints(host: &str, port: u16) {
    info!("Health:");
    info!("   Liveness:          GET    http://{host}:{port}/health");
    info!("   Readiness:         GET    http://{host}:{port}/ready");
}

#[allow(clippy::cognitive_complexity)]
fn display_calculation_endpoints(host: &str, port: u16) {
    info!("Calculations:");
    info!("   Calculate:         POST   http://{host}:{port}{API_BASE}/calculate");
    info!("   Batch:             POST   http://{host}:{port}{API_BASE}/calculate/batch");
    info!("   History:           GET    http://{host}:{port}{API_BASE}/history");
    info!("   Cache Stats:       GET    http://{host}:{port}{API_BASE}/cache/stats");
    info!("   Clear Cache:       DELETE http://{host}:{port}{API_BASE}/cache");
}

#[allow(clippy::cognitive_complexity)]
fn display_catalog_endpoints(host: &str, port: u16) {
    info!("Catalog:");
    info!("   Upsert Product:    PUT    http://{host}:{port}{API_BASE}/products/{{id}}");
    info!("   Get Product:       GET    http://{host}:{port}{API_BASE}/products/{{id}}");
    info!("   Used By:           GET    http://{host}:{port}{API_BASE}/products/{{id}}/used-by");
    info!("   Save Recipe:       PUT    http://{host}:{port}{API_BASE}/recipes");
    info!("   Validate Recipe:   POST   http://{host}:{port}{API_BASE}/recipes/validate");
    info!("   Get Recipe:        GET    http://{host}:{port}{API_BASE}/recipes/{{id}}");
    info!("   Audit:             GET    http://{host}:{port}{API_BASE}/catalog/audit");
}
