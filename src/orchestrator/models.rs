// SPDX-License-Identifier: GPL-3.0-only
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::links::WorkshopId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Succeeded,
    Failed { reason: String },
    /// Line held no workshop ID and was skipped
    Invalid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOutcome {
    /// 1-based line number in the submitted text
    pub line: usize,
    pub input: String,
    pub workshop_id: Option<WorkshopId>,
    #[serde(flatten)]
    pub status: ItemStatus,

    /// Set for attempted items only
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Aggregate result of one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub succeeded: usize,
    pub failed: usize,
    pub invalid: usize,
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchSummary {
    pub fn new(batch_id: Uuid, outcomes: Vec<ItemOutcome>) -> Self {
        let count = |pred: fn(&ItemStatus) -> bool| outcomes.iter().filter(|o| pred(&o.status)).count();
        Self {
            batch_id,
            succeeded: count(|s| matches!(s, ItemStatus::Succeeded)),
            failed: count(|s| matches!(s, ItemStatus::Failed { .. })),
            invalid: count(|s| matches!(s, ItemStatus::Invalid)),
            outcomes,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.invalid == 0
    }

    /// One-line summary shown when the batch ends
    pub fn describe(&self) -> String {
        format!(
            "Download completed: {} succeeded, {} failed, {} invalid",
            self.succeeded, self.failed, self.invalid
        )
    }
}
