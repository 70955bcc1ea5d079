// ABOUTME: Append-only calculation history with recipe filtering and paging
// ABOUTME: Defines the recorder trait, entry type, and query parameters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// In-memory history implementation
pub mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use recipe_calc_core::constants::history::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use recipe_calc_engine::CalculationResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use memory::InMemoryHistory;

/// One recorded calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Entry identifier
    pub id: Uuid,
    /// Recipe that was scaled
    pub recipe_id: Uuid,
    /// When the entry was recorded
    pub created_at: DateTime<Utc>,
    /// Whether the result was served without computing
    pub cached: bool,
    /// Time spent serving the request
    pub calculation_time_ms: u64,
    /// The result as served
    pub result: Arc<CalculationResult>,
}

/// History listing parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HistoryQuery {
    /// Only entries for this recipe
    pub recipe_id: Option<Uuid>,
    /// Page size, clamped to `1..=500`
    pub limit: Option<usize>,
    /// Entries to skip from the newest
    pub offset: Option<usize>,
}

impl HistoryQuery {
    /// Page size after defaulting and clamping
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }

    /// Whether an entry passes the recipe filter
    #[must_use]
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        self.recipe_id.map_or(true, |id| entry.recipe_id == id)
    }
}

/// History storage failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum HistoryError {
    /// Backend cannot be used; callers keep serving without history
    #[error("History store unavailable: {reason}")]
    Unavailable {
        /// Underlying failure
        reason: String,
    },
}

/// Append-only calculation log
///
/// Entries are never updated or deleted through this interface; a correction is a
/// new calculation. Implementations may drop the oldest entries to bound memory.
#[async_trait::async_trait]
pub trait HistoryRecorder: Send + Sync {
    /// Append a served calculation
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the entry could not be stored
    async fn record(
        &self,
        result: Arc<CalculationResult>,
        cached: bool,
        calculation_time_ms: u64,
    ) -> Result<HistoryEntry, HistoryError>;

    /// Entries newest first, filtered and paged by `query`
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the store cannot be read
    async fn list(&self, query: &HistoryQuery) -> Result<Vec<HistoryEntry>, HistoryError>;
}
