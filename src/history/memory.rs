// ABOUTME: Bounded in-memory calculation history
// ABOUTME: Oldest entries are dropped once the retention window is full
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use recipe_calc_engine::CalculationResult;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{HistoryEntry, HistoryError, HistoryQuery, HistoryRecorder};

/// History kept in a ring buffer ordered by insertion
pub struct InMemoryHistory {
    entries: RwLock<VecDeque<HistoryEntry>>,
    max_entries: usize,
}

impl InMemoryHistory {
    /// History retaining at most `max_entries` (at least one)
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of retained entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing has been recorded
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl HistoryRecorder for InMemoryHistory {
    async fn record(
        &self,
        result: Arc<CalculationResult>,
        cached: bool,
        calculation_time_ms: u64,
    ) -> Result<HistoryEntry, HistoryError> {
        let mut entries = self.entries.write().await;
        // Timestamp under the lock so insertion order and created_at agree.
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            recipe_id: result.recipe_id,
            created_at: Utc::now(),
            cached,
            calculation_time_ms,
            result,
        };
        entries.push_back(entry.clone());
        let mut dropped = 0_usize;
        while entries.len() > self.max_entries {
            entries.pop_front();
            dropped += 1;
        }
        drop(entries);

        if dropped > 0 {
            debug!(dropped, "History retention window exceeded");
        }
        Ok(entry)
    }

    async fn list(&self, query: &HistoryQuery) -> Result<Vec<HistoryEntry>, HistoryError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| query.matches(entry))
            .skip(query.offset.unwrap_or(0))
            .take(query.effective_limit())
            .cloned()
            .collect())
    }
}
