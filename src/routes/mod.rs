// ABOUTME: Route module organization for the recipe calculation HTTP API
// ABOUTME: Composes domain routers under the API base path with tracing, request ids, and timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module
//!
//! Each domain module contains only route definitions and thin handler functions
//! that delegate to the service layer.

/// Calculation, batch, history, and cache routes
pub mod calculations;
/// Product and recipe routes
pub mod catalog;
/// Health check and readiness routes
pub mod health;

pub use calculations::CalculationRoutes;
pub use catalog::CatalogRoutes;
pub use health::HealthRoutes;

use std::sync::Arc;

use axum::Router;
use http::{header::HeaderName, Method};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::constants::endpoints::API_BASE;
use crate::resources::ServerResources;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the complete application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    let api = Router::new()
        .merge(CalculationRoutes::routes(Arc::clone(&resources)))
        .merge(CatalogRoutes::routes(Arc::clone(&resources)));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(TimeoutLayer::new(resources.config.request_timeout))
        .layer(setup_cors());

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .nest(API_BASE, api)
        .layer(middleware)
}

fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
}
