// ABOUTME: Calculation route handlers: single, batch, history, and cache administration
// ABOUTME: Thin translation between HTTP and the calculation services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Calculation routes
//!
//! - `POST /calculate` scales one recipe
//! - `POST /calculate/batch` scales many independently
//! - `GET /history` lists recorded calculations
//! - `GET /cache/stats` and `DELETE /cache` administer the result cache

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use recipe_calc_engine::CalculationRequest;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::HistoryQuery;
use crate::resources::ServerResources;
use crate::services::BatchRequest;

/// Query parameters of `DELETE /cache`
#[derive(Debug, Default, Deserialize)]
pub struct ClearCacheQuery {
    /// Only clear results computed for this recipe
    pub recipe_id: Option<Uuid>,
}

/// Calculation routes
pub struct CalculationRoutes;

impl CalculationRoutes {
    /// Create all calculation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/calculate", post(Self::handle_calculate))
            .route("/calculate/batch", post(Self::handle_calculate_batch))
            .route("/history", get(Self::handle_history))
            .route("/cache/stats", get(Self::handle_cache_stats))
            .route("/cache", delete(Self::handle_clear_cache))
            .with_state(resources)
    }

    /// Handle a single calculation, run as a batch of one
    async fn handle_calculate(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<CalculationRequest>,
    ) -> Result<Response, AppError> {
        let outcome = resources.batch.calculate_one(request).await?;
        Ok((StatusCode::OK, Json(outcome)).into_response())
    }

    /// Handle a batch of calculations
    async fn handle_calculate_batch(
        State(resources): State<Arc<ServerResources>>,
        Json(batch): Json<BatchRequest>,
    ) -> Result<Response, AppError> {
        let result = resources.batch.calculate_batch(batch.requests).await?;
        Ok((StatusCode::OK, Json(result)).into_response())
    }

    /// Handle history listing
    async fn handle_history(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<HistoryQuery>,
    ) -> Result<Response, AppError> {
        let entries = resources.calculations.history(&query).await;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle cache statistics
    async fn handle_cache_stats(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let stats = resources.calculations.cache_stats().await?;
        Ok((StatusCode::OK, Json(stats)).into_response())
    }

    /// Handle cache clearing
    async fn handle_clear_cache(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ClearCacheQuery>,
    ) -> Result<Response, AppError> {
        resources.calculations.clear_cache(query.recipe_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
