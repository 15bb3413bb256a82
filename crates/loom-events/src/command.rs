//! Commands flowing into the engine: chapter activity reported by the host
//! and author interventions.

use serde::{Deserialize, Serialize};

use crate::thread::ThreadStatus;

/// Something that happened to a thread in a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NarrativeEvent {
    /// The thread was touched on the page
    Mention { chapter: u32 },
    /// The thread substantively advanced
    Progress { chapter: u32 },
    /// A settled point was reopened
    Regress { chapter: u32 },
    /// The thread was resolved on the page
    Resolve { chapter: u32 },
}

impl NarrativeEvent {
    pub fn chapter(&self) -> u32 {
        match self {
            NarrativeEvent::Mention { chapter }
            | NarrativeEvent::Progress { chapter }
            | NarrativeEvent::Regress { chapter }
            | NarrativeEvent::Resolve { chapter } => *chapter,
        }
    }
}

/// Types of author interventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterventionKind {
    /// Guarantee primary selection up to a chapter (defaults to the next one)
    ForceAttention {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        through_chapter: Option<u32>,
    },
    /// Bounded change to the karma weight
    AdjustKarma { delta: f32 },
    /// Terminal drop; a reason is required
    MarkAbandoned { reason: String },
    /// Declare the thread resolved
    Resolve,
    /// Request a specific status; only lifecycle edges are honoured
    SetStatus { status: ThreadStatus },
    /// Unset the blooming stamp
    ClearBlooming,
}

/// A complete intervention request against one thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    /// Target thread
    pub thread_id: String,
    /// The actual intervention to apply
    pub intervention: InterventionKind,
}

impl Intervention {
    pub fn new(thread_id: impl Into<String>, intervention: InterventionKind) -> Self {
        Self {
            thread_id: thread_id.into(),
            intervention,
        }
    }

    pub fn force_attention(thread_id: impl Into<String>) -> Self {
        Self::new(
            thread_id,
            InterventionKind::ForceAttention {
                through_chapter: None,
            },
        )
    }

    pub fn adjust_karma(thread_id: impl Into<String>, delta: f32) -> Self {
        Self::new(thread_id, InterventionKind::AdjustKarma { delta })
    }

    pub fn mark_abandoned(thread_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            thread_id,
            InterventionKind::MarkAbandoned {
                reason: reason.into(),
            },
        )
    }
}

/// A recorded lifecycle change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub thread_id: String,
    pub from: ThreadStatus,
    pub to: ThreadStatus,
    pub chapter: u32,
}
