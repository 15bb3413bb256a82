//! Author interventions.
//!
//! Each intervention is applied to a scratch copy of the thread and only
//! committed when every check passes, so a rejected request never leaves a
//! thread half-edited.

use loom_events::{clamp_karma, Intervention, InterventionKind, StatusChange, Thread, ThreadStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::transitions::{apply_transition, TransitionError};

/// Why an intervention was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterventionError {
    #[error("intervention targets {requested} but was applied to {actual}")]
    ThreadMismatch { requested: String, actual: String },
    #[error("thread {id} is {status} and cannot be changed")]
    Terminal { id: String, status: ThreadStatus },
    #[error("abandoning a thread requires a reason")]
    MissingReason,
    #[error("karma delta {0} is not a finite number")]
    InvalidDelta(f32),
    #[error("forced attention through chapter {through} is already past (current chapter {current})")]
    AttentionInPast { through: u32, current: u32 },
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// What an accepted intervention changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedIntervention {
    pub thread_id: String,
    pub chapter: u32,
    pub intervention: InterventionKind,
    /// Set when the intervention moved the thread along its lifecycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_change: Option<StatusChange>,
    /// Human-readable account of the change
    pub description: String,
}

/// Applies an intervention to `thread` at `current_chapter`.
pub fn apply(
    thread: &mut Thread,
    intervention: &Intervention,
    current_chapter: u32,
) -> Result<AppliedIntervention, InterventionError> {
    match apply_to_copy(thread, intervention, current_chapter) {
        Ok((updated, applied)) => {
            *thread = updated;
            info!(thread = %applied.thread_id, chapter = current_chapter, "{}", applied.description);
            Ok(applied)
        }
        Err(e) => {
            warn!(thread = %intervention.thread_id, error = %e, "intervention rejected");
            Err(e)
        }
    }
}

fn apply_to_copy(
    thread: &Thread,
    intervention: &Intervention,
    current_chapter: u32,
) -> Result<(Thread, AppliedIntervention), InterventionError> {
    if intervention.thread_id != thread.id {
        return Err(InterventionError::ThreadMismatch {
            requested: intervention.thread_id.clone(),
            actual: thread.id.clone(),
        });
    }
    if thread.is_terminal() {
        return Err(InterventionError::Terminal {
            id: thread.id.clone(),
            status: thread.status,
        });
    }

    let mut updated = thread.clone();
    let mut status_change = None;

    let description = match &intervention.intervention {
        InterventionKind::ForceAttention { through_chapter } => {
            let through = through_chapter.unwrap_or(current_chapter.saturating_add(1));
            if through < current_chapter {
                return Err(InterventionError::AttentionInPast {
                    through,
                    current: current_chapter,
                });
            }
            updated.attention_forced_through = Some(through);
            format!("Forced attention through chapter {}", through)
        }

        InterventionKind::AdjustKarma { delta } => {
            if !delta.is_finite() {
                return Err(InterventionError::InvalidDelta(*delta));
            }
            let before = updated.karma_weight;
            updated.karma_weight = clamp_karma(before + delta);
            format!("Adjusted karma {:.1} -> {:.1}", before, updated.karma_weight)
        }

        InterventionKind::MarkAbandoned { reason } => {
            let reason = reason.trim();
            if reason.is_empty() {
                return Err(InterventionError::MissingReason);
            }
            status_change = Some(apply_transition(&mut updated, ThreadStatus::Abandoned, current_chapter)?);
            updated.abandonment_reason = Some(reason.to_string());
            format!("Abandoned: {}", reason)
        }

        InterventionKind::Resolve => {
            status_change = Some(apply_transition(&mut updated, ThreadStatus::Closed, current_chapter)?);
            "Resolved by author".to_string()
        }

        InterventionKind::SetStatus { status } => {
            let change = apply_transition(&mut updated, *status, current_chapter)?;
            let description = format!("Status set {} -> {}", change.from, change.to);
            status_change = Some(change);
            description
        }

        InterventionKind::ClearBlooming => {
            let previous = updated.blooming_chapter.take();
            match previous {
                Some(chapter) => format!("Cleared blooming stamp from chapter {}", chapter),
                None => "Blooming stamp already clear".to_string(),
            }
        }
    };

    let applied = AppliedIntervention {
        thread_id: updated.id.clone(),
        chapter: current_chapter,
        intervention: intervention.intervention.clone(),
        status_change,
        description,
    };
    Ok((updated, applied))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_events::ThreadCategory;

    fn thread(status: ThreadStatus) -> Thread {
        Thread::new("t-1", "Test", ThreadCategory::Minor, 40.0, 1).with_status(status)
    }

    fn apply_at(thread: &mut Thread, intervention: Intervention, chapter: u32) -> Result<AppliedIntervention, InterventionError> {
        apply(thread, &intervention, chapter)
    }

    #[test]
    fn test_force_attention_defaults_to_next_chapter() {
        let mut t = thread(ThreadStatus::Open);
        apply_at(&mut t, Intervention::force_attention("t-1"), 9).unwrap();

        assert_eq!(t.attention_forced_through, Some(10));
        assert!(t.attention_forced_at(10));
        assert!(!t.attention_forced_at(11));
    }

    #[test]
    fn test_force_attention_at_last_chapter_saturates() {
        let mut t = thread(ThreadStatus::Open);
        apply_at(&mut t, Intervention::force_attention("t-1"), u32::MAX).unwrap();
        assert_eq!(t.attention_forced_through, Some(u32::MAX));
    }

    #[test]
    fn test_force_attention_in_past_rejected() {
        let mut t = thread(ThreadStatus::Open);
        let request = Intervention::new(
            "t-1",
            InterventionKind::ForceAttention {
                through_chapter: Some(3),
            },
        );
        let err = apply_at(&mut t, request, 9).unwrap_err();
        assert_eq!(err, InterventionError::AttentionInPast { through: 3, current: 9 });
    }

    #[test]
    fn test_adjust_karma_is_bounded() {
        let mut t = thread(ThreadStatus::Active);
        apply_at(&mut t, Intervention::adjust_karma("t-1", 200.0), 5).unwrap();
        assert_eq!(t.karma_weight, 100.0);

        apply_at(&mut t, Intervention::adjust_karma("t-1", -500.0), 5).unwrap();
        assert_eq!(t.karma_weight, 0.0);

        let err = apply_at(&mut t, Intervention::adjust_karma("t-1", f32::NAN), 5).unwrap_err();
        assert!(matches!(err, InterventionError::InvalidDelta(_)));

        t.karma_weight = f32::NAN;
        apply_at(&mut t, Intervention::adjust_karma("t-1", 10.0), 5).unwrap();
        assert_eq!(t.karma_weight, 0.0);
    }

    #[test]
    fn test_abandonment_needs_reason() {
        let mut t = thread(ThreadStatus::Stalled);
        let snapshot = t.clone();

        let err = apply_at(&mut t, Intervention::mark_abandoned("t-1", "  "), 20).unwrap_err();
        assert_eq!(err, InterventionError::MissingReason);
        assert_eq!(t, snapshot);

        let applied = apply_at(&mut t, Intervention::mark_abandoned("t-1", "cut in revision"), 20).unwrap();
        assert_eq!(t.status, ThreadStatus::Abandoned);
        assert!(t.intentional_abandonment);
        assert_eq!(t.abandonment_reason.as_deref(), Some("cut in revision"));
        assert_eq!(applied.status_change.unwrap().to, ThreadStatus::Abandoned);
    }

    #[test]
    fn test_terminal_threads_reject_everything() {
        let mut t = thread(ThreadStatus::Closed);
        let snapshot = t.clone();

        for request in [
            Intervention::force_attention("t-1"),
            Intervention::adjust_karma("t-1", 5.0),
            Intervention::new("t-1", InterventionKind::SetStatus { status: ThreadStatus::Active }),
        ] {
            let err = apply_at(&mut t, request, 30).unwrap_err();
            assert!(matches!(err, InterventionError::Terminal { .. }));
        }
        assert_eq!(t, snapshot);
    }

    #[test]
    fn test_set_status_follows_edge_table() {
        let mut t = thread(ThreadStatus::Open);

        let err = apply_at(
            &mut t,
            Intervention::new("t-1", InterventionKind::SetStatus { status: ThreadStatus::Blooming }),
            6,
        )
        .unwrap_err();
        assert!(matches!(err, InterventionError::Transition(_)));
        assert_eq!(t.status, ThreadStatus::Open);

        apply_at(
            &mut t,
            Intervention::new("t-1", InterventionKind::SetStatus { status: ThreadStatus::Active }),
            6,
        )
        .unwrap();
        assert_eq!(t.status, ThreadStatus::Active);
        assert_eq!(t.status_since_chapter, 6);
    }

    #[test]
    fn test_resolve_and_clear_blooming() {
        let mut t = thread(ThreadStatus::Blooming);
        t.blooming_chapter = Some(12);

        apply_at(&mut t, Intervention::new("t-1", InterventionKind::ClearBlooming), 15).unwrap();
        assert!(t.blooming_chapter.is_none());
        assert_eq!(t.status, ThreadStatus::Blooming);

        let applied = apply_at(&mut t, Intervention::new("t-1", InterventionKind::Resolve), 16).unwrap();
        assert_eq!(t.status, ThreadStatus::Closed);
        assert_eq!(applied.status_change.unwrap().from, ThreadStatus::Blooming);
    }

    #[test]
    fn test_mismatched_thread_rejected() {
        let mut t = thread(ThreadStatus::Open);
        let err = apply_at(&mut t, Intervention::force_attention("t-2"), 3).unwrap_err();
        assert!(matches!(err, InterventionError::ThreadMismatch { .. }));
        assert!(t.attention_forced_through.is_none());
    }
}
