// ABOUTME: Catalog route handlers for products, recipes, validation, and audits
// ABOUTME: Recipe writes are validated for rule violations and cycles before persisting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use recipe_calc_core::models::{Product, ProductKind, RecipeDraft, Unit};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::resources::ServerResources;

/// Product body of `PUT /products/:id`; the id comes from the path
#[derive(Debug, Clone, Deserialize)]
pub struct ProductBody {
    /// Display name
    pub name: String,
    /// Classification
    pub kind: ProductKind,
    /// Base unit
    pub unit: Unit,
}

/// Catalog routes
pub struct CatalogRoutes;

impl CatalogRoutes {
    /// Create all catalog routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/products/:id",
                put(Self::handle_put_product).get(Self::handle_get_product),
            )
            .route("/products/:id/used-by", get(Self::handle_used_by))
            .route("/recipes", put(Self::handle_save_recipe))
            .route("/recipes/validate", post(Self::handle_validate_recipe))
            .route("/recipes/:id", get(Self::handle_get_recipe))
            .route("/catalog/audit", get(Self::handle_audit))
            .with_state(resources)
    }

    /// Handle product create or replace
    async fn handle_put_product(
        State(resources): State<Arc<ServerResources>>,
        Path(product_id): Path<Uuid>,
        Json(body): Json<ProductBody>,
    ) -> Result<Response, AppError> {
        let product = Product::new(product_id, body.name, body.kind, body.unit);
        let stored = resources.recipes.upsert_product(product).await?;
        Ok((StatusCode::OK, Json(stored)).into_response())
    }

    /// Handle product lookup
    async fn handle_get_product(
        State(resources): State<Arc<ServerResources>>,
        Path(product_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let product = resources.recipes.get_product(product_id).await?;
        Ok((StatusCode::OK, Json(product)).into_response())
    }

    /// Handle where-used lookup
    async fn handle_used_by(
        State(resources): State<Arc<ServerResources>>,
        Path(product_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let users = resources.recipes.used_by(product_id).await?;
        Ok((StatusCode::OK, Json(users)).into_response())
    }

    /// Handle recipe create or update
    async fn handle_save_recipe(
        State(resources): State<Arc<ServerResources>>,
        Json(draft): Json<RecipeDraft>,
    ) -> Result<Response, AppError> {
        let saved = resources.recipes.save_recipe(draft).await?;
        let status = if saved.created {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        Ok((status, Json(saved)).into_response())
    }

    /// Handle dry-run recipe validation
    async fn handle_validate_recipe(
        State(resources): State<Arc<ServerResources>>,
        Json(draft): Json<RecipeDraft>,
    ) -> Result<Response, AppError> {
        resources.recipes.validate_recipe(&draft).await?;
        Ok((StatusCode::OK, Json(json!({ "valid": true }))).into_response())
    }

    /// Handle recipe lookup
    async fn handle_get_recipe(
        State(resources): State<Arc<ServerResources>>,
        Path(recipe_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let recipe = resources.recipes.get_recipe(recipe_id).await?;
        Ok((StatusCode::OK, Json(recipe)).into_response())
    }

    /// Handle whole-catalog cycle audit
    async fn handle_audit(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let report = resources.recipes.audit().await?;
        Ok((StatusCode::OK, Json(report)).into_response())
    }
}
