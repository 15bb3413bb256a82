//! Next-chapter selection output.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::PayoffHorizon;
use crate::thread::{ThreadCategory, ThreadStatus};

/// Why a thread was placed in the primary set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionTrigger {
    /// Sovereign threads are never skippable
    SovereignMandate,
    /// The author forced attention on the thread
    ForcedAttention,
    /// Payoff is past its window
    OverduePayoff,
    /// Payoff is due now
    PerfectWindow,
    /// A stalled thread can be picked back up
    StalledRecovery,
    /// Urgency crossed the primary threshold
    UrgencyThreshold,
    /// Optional slot, no trigger
    Ranked,
}

impl fmt::Display for SelectionTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SelectionTrigger::SovereignMandate => "sovereign mandate",
            SelectionTrigger::ForcedAttention => "forced attention",
            SelectionTrigger::OverduePayoff => "overdue payoff",
            SelectionTrigger::PerfectWindow => "perfect window",
            SelectionTrigger::StalledRecovery => "stalled recovery",
            SelectionTrigger::UrgencyThreshold => "urgency threshold",
            SelectionTrigger::Ranked => "ranked",
        };
        f.write_str(label)
    }
}

/// One thread chosen for the next chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedThread {
    pub thread_id: String,
    pub title: String,
    pub category: ThreadCategory,
    pub status: ThreadStatus,
    pub urgency: f32,
    pub payoff_debt: f32,
    pub payoff_horizon: PayoffHorizon,
    pub trigger: SelectionTrigger,
}

/// Which threads the next chapter must and may carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadSelectionResult {
    /// Chapter the selection is for
    pub target_chapter: u32,
    /// Mandatory threads
    pub primary_threads: Vec<SelectedThread>,
    /// Optional threads
    pub secondary_threads: Vec<SelectedThread>,
    /// One advisory line per primary thread
    pub reasoning: Vec<String>,
    /// Mandatory threads alone exceeded the primary cap
    #[serde(default)]
    pub over_capacity: bool,
}

impl ThreadSelectionResult {
    /// Creates an empty result.
    pub fn empty(target_chapter: u32) -> Self {
        Self {
            target_chapter,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary_threads.is_empty() && self.secondary_threads.is_empty()
    }

    /// Checks if a thread is in the primary set.
    pub fn is_primary(&self, thread_id: &str) -> bool {
        self.primary_threads.iter().any(|t| t.thread_id == thread_id)
    }

    /// Checks if a thread is in the secondary set.
    pub fn is_secondary(&self, thread_id: &str) -> bool {
        self.secondary_threads.iter().any(|t| t.thread_id == thread_id)
    }

    /// Ids of primary threads in selection order.
    pub fn primary_ids(&self) -> Vec<&str> {
        self.primary_threads
            .iter()
            .map(|t| t.thread_id.as_str())
            .collect()
    }
}
