// ABOUTME: Batch coordinator running independent calculations concurrently
// ABOUTME: Per-item failures are isolated and results keep the input order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use recipe_calc_core::errors::{AppError, AppResult, CalculationError, CalculationErrorReport};
use recipe_calc_engine::CalculationRequest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::calculation::{CalculationOutcome, CalculationService};
use crate::config::BatchConfig;
use crate::logging::AppLogger;

/// Batch request body
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    /// Independent calculations
    pub requests: Vec<CalculationRequest>,
}

/// Outcome of one batch item
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchItem {
    /// The calculation succeeded
    Success {
        /// Position in the submitted batch
        index: usize,
        /// Served calculation
        outcome: CalculationOutcome,
    },
    /// The calculation failed; other items are unaffected
    Failed {
        /// Position in the submitted batch
        index: usize,
        /// Why it failed
        error: CalculationErrorReport,
    },
}

impl BatchItem {
    fn from_result(index: usize, result: Result<CalculationOutcome, CalculationError>) -> Self {
        match result {
            Ok(outcome) => Self::Success { index, outcome },
            Err(error) => Self::Failed {
                index,
                error: error.report(),
            },
        }
    }

    /// Whether the item succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Successful outcome, if any
    #[must_use]
    pub const fn outcome(&self) -> Option<&CalculationOutcome> {
        match self {
            Self::Success { outcome, .. } => Some(outcome),
            Self::Failed { .. } => None,
        }
    }

    /// Failure report, if any
    #[must_use]
    pub const fn error(&self) -> Option<&CalculationErrorReport> {
        match self {
            Self::Success { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}

/// Aggregate batch statistics
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Items submitted
    pub total_requests: usize,
    /// Items that succeeded
    pub successful: usize,
    /// Items that failed
    pub failed: usize,
    /// Wall-clock span of the whole batch
    pub total_time_ms: u64,
    /// `total_time_ms` divided by the item count
    pub average_time_ms: f64,
}

/// Batch response body
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// One item per request, in submission order
    pub results: Vec<BatchItem>,
    /// Aggregate statistics
    pub summary: BatchSummary,
}

/// Runs batches on the Tokio worker pool
#[derive(Clone)]
pub struct BatchCoordinator {
    service: Arc<CalculationService>,
    config: BatchConfig,
}

impl BatchCoordinator {
    /// Create a coordinator over a calculation service
    #[must_use]
    pub const fn new(service: Arc<CalculationService>, config: BatchConfig) -> Self {
        Self { service, config }
    }

    /// Calculate a single request as a batch of one
    ///
    /// Runs on the same isolated item task as batch members, so a panic surfaces as
    /// an internal error rather than tearing down the caller.
    ///
    /// # Errors
    ///
    /// Returns the request's calculation error
    #[instrument(skip(self, request), fields(recipe_id = %request.recipe_id))]
    pub async fn calculate_one(
        &self,
        request: CalculationRequest,
    ) -> Result<CalculationOutcome, CalculationError> {
        Self::run_item(Arc::clone(&self.service), request).await
    }

    /// Calculate every request independently
    ///
    /// Items run concurrently, at most `concurrency` at a time, each on its own task
    /// so a panicking item is reported as an internal error instead of failing the
    /// batch.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for an empty batch or one above `max_batch_size`
    #[instrument(skip(self, requests), fields(batch_size = requests.len()))]
    pub async fn calculate_batch(
        &self,
        requests: Vec<CalculationRequest>,
    ) -> AppResult<BatchResult> {
        if requests.is_empty() {
            return Err(AppError::invalid_input("Batch must contain at least one request"));
        }
        if requests.len() > self.config.max_batch_size {
            return Err(AppError::invalid_input(format!(
                "Batch of {} requests exceeds the limit of {}",
                requests.len(),
                self.config.max_batch_size
            ))
            .with_details(json!({
                "requested": requests.len(),
                "limit": self.config.max_batch_size,
            })));
        }

        let started = Instant::now();
        let total_requests = requests.len();

        let results: Vec<BatchItem> = stream::iter(requests.into_iter().enumerate())
            .map(|(index, request)| {
                let service = Arc::clone(&self.service);
                async move { BatchItem::from_result(index, Self::run_item(service, request).await) }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let total_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let successful = results.iter().filter(|item| item.is_success()).count();
        let failed = total_requests - successful;
        AppLogger::log_batch(total_requests, successful, failed, total_time_ms);

        let average_time_ms = total_time_ms as f64 / total_requests as f64;

        Ok(BatchResult {
            results,
            summary: BatchSummary {
                total_requests,
                successful,
                failed,
                total_time_ms,
                average_time_ms,
            },
        })
    }

    async fn run_item(
        service: Arc<CalculationService>,
        request: CalculationRequest,
    ) -> Result<CalculationOutcome, CalculationError> {
        let handle = tokio::spawn(async move { service.calculate(&request).await });
        handle.await.unwrap_or_else(|join_error| {
            Err(CalculationError::Internal {
                reason: format!("Batch item task failed: {join_error}"),
            })
        })
    }
}
