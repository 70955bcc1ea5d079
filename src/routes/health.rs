// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness reports the process is up; readiness checks the catalog and reports the cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for service monitoring

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;

use crate::constants::endpoints::{HEALTH_CHECK, READY_CHECK};
use crate::constants::service_names;
use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(HEALTH_CHECK, get(Self::health_handler))
            .route(READY_CHECK, get(Self::ready_handler))
            .with_state(resources)
    }

    async fn health_handler() -> Json<serde_json::Value> {
        Json(json!({
            "status": "healthy",
            "service": service_names::RECIPE_CALC_SERVER,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339()
        }))
    }

    async fn ready_handler(State(resources): State<Arc<ServerResources>>) -> impl IntoResponse {
        let catalog_ready = resources.catalog.snapshot().await.is_ok();
        let cache_ready = resources.calculations.cache_healthy().await;
        // The cache is an accelerant; only the catalog gates readiness.
        let ready = catalog_ready;

        let status = if ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (
            status,
            Json(json!({
                "status": if ready { "ready" } else { "not_ready" },
                "checks": {
                    "catalog": catalog_ready,
                    "cache": cache_ready
                },
                "timestamp": Utc::now().to_rfc3339()
            })),
        )
    }
}
