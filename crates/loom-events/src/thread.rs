//! Thread Types
//!
//! The stored record for a tracked narrative promise. Only persisted,
//! author- or event-driven fields live here; physical quantities are
//! projections computed by the engine and never stored on the thread.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorial importance tier of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCategory {
    /// Load-bearing for the whole work, never silently dropped
    Sovereign,
    /// A main plotline or central relationship
    Major,
    /// A side plot
    #[default]
    Minor,
    /// A planted setup that may or may not grow
    Seed,
}

impl ThreadCategory {
    /// All categories, most important first.
    pub const ALL: [ThreadCategory; 4] = [
        ThreadCategory::Sovereign,
        ThreadCategory::Major,
        ThreadCategory::Minor,
        ThreadCategory::Seed,
    ];

    /// Ordinal rank used for tie-breaking (higher is more important).
    pub fn rank(self) -> u8 {
        match self {
            ThreadCategory::Sovereign => 3,
            ThreadCategory::Major => 2,
            ThreadCategory::Minor => 1,
            ThreadCategory::Seed => 0,
        }
    }

    /// Parses a category name, accepting the labels used by older trackers.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sovereign" | "critical" => Some(ThreadCategory::Sovereign),
            "major" | "main" => Some(ThreadCategory::Major),
            "minor" | "side" => Some(ThreadCategory::Minor),
            "seed" | "foreshadowing" | "planted" => Some(ThreadCategory::Seed),
            _ => None,
        }
    }
}

impl fmt::Display for ThreadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ThreadCategory::Sovereign => "sovereign",
            ThreadCategory::Major => "major",
            ThreadCategory::Minor => "minor",
            ThreadCategory::Seed => "seed",
        };
        f.write_str(label)
    }
}

/// Lifecycle status of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    /// Planted, not yet picked up again
    #[default]
    Seed,
    /// Mentioned after its introduction
    Open,
    /// Clearly being developed
    Active,
    /// Inside its resolution window
    Blooming,
    /// Left untouched beyond the stall distance
    Stalled,
    /// Resolved on the page
    Closed,
    /// Dropped by the author
    Abandoned,
}

impl ThreadStatus {
    /// Parses a status name (case insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "seed" => Some(ThreadStatus::Seed),
            "open" => Some(ThreadStatus::Open),
            "active" => Some(ThreadStatus::Active),
            "blooming" => Some(ThreadStatus::Blooming),
            "stalled" => Some(ThreadStatus::Stalled),
            "closed" | "resolved" => Some(ThreadStatus::Closed),
            "abandoned" => Some(ThreadStatus::Abandoned),
            _ => None,
        }
    }

    /// Closed and Abandoned have no outgoing edges.
    pub fn is_terminal(self) -> bool {
        matches!(self, ThreadStatus::Closed | ThreadStatus::Abandoned)
    }

    /// Returns true if `self -> next` is an edge of the lifecycle graph.
    ///
    /// Self-loops are not edges.
    pub fn can_transition_to(self, next: ThreadStatus) -> bool {
        use ThreadStatus::*;

        if self.is_terminal() || self == next {
            return false;
        }

        match next {
            Closed | Abandoned => true,
            Open => self == Seed,
            Active => matches!(self, Open | Stalled),
            Blooming => self == Active,
            Stalled => matches!(self, Seed | Open | Active | Blooming),
            Seed => false,
        }
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ThreadStatus::Seed => "seed",
            ThreadStatus::Open => "open",
            ThreadStatus::Active => "active",
            ThreadStatus::Blooming => "blooming",
            ThreadStatus::Stalled => "stalled",
            ThreadStatus::Closed => "closed",
            ThreadStatus::Abandoned => "abandoned",
        };
        f.write_str(label)
    }
}

/// Direction of a substantive touch on a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    /// The thread moved toward its payoff
    Advance,
    /// A settled point was reopened
    Regress,
}

/// A chapter-stamped progression record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMark {
    pub chapter: u32,
    pub kind: ProgressKind,
}

impl ProgressMark {
    pub fn advance(chapter: u32) -> Self {
        Self {
            chapter,
            kind: ProgressKind::Advance,
        }
    }

    pub fn regress(chapter: u32) -> Self {
        Self {
            chapter,
            kind: ProgressKind::Regress,
        }
    }
}

/// A tracked narrative thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Opaque identifier supplied by the host
    pub id: String,
    /// Human title
    pub title: String,
    /// Compact descriptor for dense listings
    #[serde(default)]
    pub signature: String,
    /// Importance tier
    pub category: ThreadCategory,
    /// Lifecycle status
    pub status: ThreadStatus,
    /// Authorial weight, 0 to 100
    pub karma_weight: f32,
    /// Accumulated reader expectation, never negative
    #[serde(default)]
    pub payoff_debt: f32,
    /// Chapter where the thread was introduced
    pub first_chapter: u32,
    /// Most recent chapter that touched the thread
    pub last_mentioned_chapter: u32,
    /// Chapter the thread entered its resolution window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blooming_chapter: Option<u32>,
    /// Narrative touches of any kind
    #[serde(default)]
    pub mention_count: u32,
    /// Substantive advancements
    #[serde(default)]
    pub progress_count: u32,
    /// Chapter-stamped advancement history
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub progress_log: Vec<ProgressMark>,
    /// Chapter of the most recent advancement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_progress_chapter: Option<u32>,
    /// Chapter of the most recent status change
    #[serde(default)]
    pub status_since_chapter: u32,
    /// `progress_count` when the status last changed
    #[serde(default)]
    pub progress_at_status_change: u32,
    /// Highest chapter already accounted by a chapter advance
    #[serde(default)]
    pub last_evaluated_chapter: u32,
    /// Forced into primary selection up to and including this chapter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attention_forced_through: Option<u32>,
    #[serde(default)]
    pub summary: String,
    /// What "done" means for this thread
    #[serde(default)]
    pub resolution_criteria: String,
    /// Character references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<String>,
    /// Author override excluding the thread from ranking for good
    #[serde(default)]
    pub intentional_abandonment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abandonment_reason: Option<String>,
}

impl Thread {
    /// Creates a thread introduced at `first_chapter` with neutral accounting.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: ThreadCategory,
        karma_weight: f32,
        first_chapter: u32,
    ) -> Self {
        let title = title.into();
        Self {
            id: id.into(),
            signature: derive_signature(&title),
            title,
            category,
            status: ThreadStatus::Seed,
            karma_weight: clamp_karma(karma_weight),
            payoff_debt: 0.0,
            first_chapter,
            last_mentioned_chapter: first_chapter,
            blooming_chapter: None,
            mention_count: 1,
            progress_count: 0,
            progress_log: Vec::new(),
            last_progress_chapter: None,
            status_since_chapter: first_chapter,
            progress_at_status_change: 0,
            last_evaluated_chapter: first_chapter,
            attention_forced_through: None,
            summary: String::new(),
            resolution_criteria: String::new(),
            participants: Vec::new(),
            intentional_abandonment: false,
            abandonment_reason: None,
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: ThreadStatus) -> Self {
        self.status = status;
        self.progress_at_status_change = self.progress_count;
        self
    }

    /// Sets the payoff debt.
    pub fn with_debt(mut self, debt: f32) -> Self {
        self.payoff_debt = debt.max(0.0);
        self
    }

    /// Sets the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Adds a participant, ignoring duplicates.
    pub fn add_participant(&mut self, character: impl Into<String>) {
        let character = character.into();
        if !self.participants.contains(&character) {
            self.participants.push(character);
        }
    }

    /// Checks if this thread involves a specific character.
    pub fn involves(&self, character: &str) -> bool {
        self.participants.iter().any(|p| p == character)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Closed, abandoned or intentionally dropped: never ranked again.
    pub fn is_retired(&self) -> bool {
        self.is_terminal() || self.intentional_abandonment
    }

    /// True while a force-attention command covers `chapter`.
    pub fn attention_forced_at(&self, chapter: u32) -> bool {
        self.attention_forced_through
            .is_some_and(|through| chapter <= through)
    }
}

/// Clamps an authorial weight into 0..=100; NaN counts as no weight.
pub fn clamp_karma(karma_weight: f32) -> f32 {
    if karma_weight.is_nan() {
        0.0
    } else {
        karma_weight.clamp(0.0, 100.0)
    }
}

/// Builds a compact signature from a title.
pub fn derive_signature(title: &str) -> String {
    const MAX_SIGNATURE_CHARS: usize = 24;

    let trimmed = title.trim();
    if trimmed.chars().count() <= MAX_SIGNATURE_CHARS {
        return trimmed.to_string();
    }
    let mut signature: String = trimmed.chars().take(MAX_SIGNATURE_CHARS - 1).collect();
    signature.push('…');
    signature
}
