//! Thread lifecycle state machine.
//!
//! Two entry points mutate a stored thread:
//!
//! - [`record`] applies one chapter-stamped narrative event (mention,
//!   progress, regression, resolution) to the accounting fields.
//! - [`advance`] is the once-per-chapter call: it accrues payoff debt for
//!   silent chapters and fires at most one lifecycle rule.
//!
//! Every status write goes through [`apply_transition`], which refuses
//! anything outside the edge table in [`ThreadStatus::can_transition_to`].
//! `advance` is idempotent per chapter, so repeated calls cannot flap a
//! thread between Active and Stalled.

use loom_events::{NarrativeEvent, ProgressMark, StatusChange, Thread, ThreadStatus};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{LoomConfig, PhysicsConfig};
use crate::health::in_payoff_window;
use crate::physics::{self, ChapterSpan};

/// Rejected lifecycle requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("illegal transition {from} -> {to}")]
    IllegalTransition { from: ThreadStatus, to: ThreadStatus },
    #[error("thread {id} is {status} and accepts no further events")]
    Terminal { id: String, status: ThreadStatus },
}

/// Moves a thread along one lifecycle edge.
///
/// Stamps `blooming_chapter` on entry to Blooming (only if unset) and
/// flags intentional abandonment on entry to Abandoned.
pub fn apply_transition(
    thread: &mut Thread,
    to: ThreadStatus,
    chapter: u32,
) -> Result<StatusChange, TransitionError> {
    let from = thread.status;
    if !from.can_transition_to(to) {
        return Err(TransitionError::IllegalTransition { from, to });
    }

    match to {
        ThreadStatus::Blooming => {
            thread.blooming_chapter.get_or_insert(chapter);
        }
        ThreadStatus::Abandoned => thread.intentional_abandonment = true,
        _ => {}
    }
    thread.status = to;
    thread.status_since_chapter = chapter;
    thread.progress_at_status_change = thread.progress_count;

    debug!(thread = %thread.id, %from, %to, chapter, "status transition");
    Ok(StatusChange {
        thread_id: thread.id.clone(),
        from,
        to,
        chapter,
    })
}

/// Applies one narrative event to a thread's accounting.
///
/// Only a resolution changes status; lifecycle rules driven by mentions and
/// progress fire on the next [`advance`].
pub fn record(
    thread: &mut Thread,
    event: NarrativeEvent,
    config: &LoomConfig,
) -> Result<Option<StatusChange>, TransitionError> {
    if thread.is_terminal() {
        return Err(TransitionError::Terminal {
            id: thread.id.clone(),
            status: thread.status,
        });
    }

    let chapter = event.chapter();
    let chapter = if chapter < thread.first_chapter {
        warn!(thread = %thread.id, chapter, first = thread.first_chapter, "event precedes introduction");
        thread.first_chapter
    } else {
        chapter
    };

    touch(thread, chapter);

    match event {
        NarrativeEvent::Mention { .. } => Ok(None),
        NarrativeEvent::Progress { .. } => {
            thread.progress_count = thread.progress_count.saturating_add(1);
            thread.progress_log.push(ProgressMark::advance(chapter));
            thread.last_progress_chapter = Some(thread.last_progress_chapter.map_or(chapter, |c| c.max(chapter)));
            thread.payoff_debt = (thread.payoff_debt - config.physics.progress_debt_relief).max(0.0);
            Ok(None)
        }
        NarrativeEvent::Regress { .. } => {
            thread.progress_log.push(ProgressMark::regress(chapter));
            Ok(None)
        }
        NarrativeEvent::Resolve { .. } => apply_transition(thread, ThreadStatus::Closed, chapter).map(Some),
    }
}

/// Advances a thread to `current_chapter`.
///
/// No-op for terminal threads and for chapters already accounted.
pub fn advance(thread: &mut Thread, current_chapter: u32, config: &LoomConfig) -> Option<StatusChange> {
    if thread.is_terminal() || current_chapter <= thread.last_evaluated_chapter {
        return None;
    }

    accrue_debt(thread, current_chapter, &config.physics);
    thread.last_evaluated_chapter = current_chapter;

    let next = next_status(thread, current_chapter, config)?;
    match apply_transition(thread, next, current_chapter) {
        Ok(change) => Some(change),
        Err(e) => {
            // next_status only proposes edges; reaching this is a bug.
            warn!(thread = %thread.id, error = %e, "lifecycle rule proposed a non-edge");
            None
        }
    }
}

/// The single rule that fires for the thread's current status, if any.
fn next_status(thread: &Thread, current_chapter: u32, config: &LoomConfig) -> Option<ThreadStatus> {
    let span = ChapterSpan::of(thread, current_chapter);
    let stalled = span.distance() > config.transitions.stall_distance_chapters;

    match thread.status {
        ThreadStatus::Seed => {
            if span.last_mentioned > span.first {
                Some(ThreadStatus::Open)
            } else if stalled {
                Some(ThreadStatus::Stalled)
            } else {
                None
            }
        }
        ThreadStatus::Open => {
            if thread.progress_count >= config.transitions.min_progress_for_active {
                Some(ThreadStatus::Active)
            } else if stalled {
                Some(ThreadStatus::Stalled)
            } else {
                None
            }
        }
        ThreadStatus::Active => {
            let physics = physics::compute(thread, current_chapter, &config.physics);
            if stalled {
                Some(ThreadStatus::Stalled)
            } else if in_payoff_window(thread, &physics, &config.health) {
                Some(ThreadStatus::Blooming)
            } else {
                None
            }
        }
        ThreadStatus::Blooming => stalled.then_some(ThreadStatus::Stalled),
        ThreadStatus::Stalled => {
            let recovered = thread.progress_count > thread.progress_at_status_change;
            recovered.then_some(ThreadStatus::Active)
        }
        ThreadStatus::Closed | ThreadStatus::Abandoned => None,
    }
}

/// Adds debt for chapters in `(max(last_evaluated, last_mentioned), current]`.
fn accrue_debt(thread: &mut Thread, current_chapter: u32, config: &PhysicsConfig) {
    let span = ChapterSpan::of(thread, current_chapter);
    let from = thread.last_evaluated_chapter.max(span.last_mentioned);
    let silent = current_chapter.saturating_sub(from);
    if silent == 0 {
        return;
    }

    let growth = config.debt_growth_per_silent_chapter * config.category_weights.get(thread.category);
    thread.payoff_debt = (thread.payoff_debt.max(0.0) + silent as f32 * growth).max(0.0);
}

fn touch(thread: &mut Thread, chapter: u32) {
    thread.mention_count = thread.mention_count.saturating_add(1);
    thread.last_mentioned_chapter = thread.last_mentioned_chapter.max(chapter);
}
