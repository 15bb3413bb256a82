//! Next-chapter thread selection.
//!
//! Decides which threads the next chapter must carry and which it may
//! carry. Sovereign threads and threads under forced attention are
//! mandatory; the rest compete on urgency.

use std::cmp::Ordering;

use loom_events::{
    PayoffHorizon, SelectedThread, SelectionTrigger, Thread, ThreadCategory, ThreadHealth,
    ThreadPhysics, ThreadSelectionResult, ThreadStatus,
};
use tracing::debug;

use crate::config::LoomConfig;
use crate::{health, physics};

/// A thread with its derived state at the target chapter.
#[derive(Debug, Clone)]
struct Candidate<'a> {
    thread: &'a Thread,
    physics: ThreadPhysics,
    health: ThreadHealth,
}

impl<'a> Candidate<'a> {
    fn evaluate(thread: &'a Thread, target_chapter: u32, config: &LoomConfig) -> Self {
        let physics = physics::compute(thread, target_chapter, &config.physics);
        let health = health::evaluate(thread, &physics, &config.health);
        Self {
            thread,
            physics,
            health,
        }
    }

    fn is_mandatory(&self, target_chapter: u32) -> bool {
        self.thread.category == ThreadCategory::Sovereign
            || self.thread.attention_forced_at(target_chapter)
    }

    /// Trigger for a primary slot; the first matching reason wins.
    fn primary_trigger(&self, target_chapter: u32) -> SelectionTrigger {
        if self.thread.category == ThreadCategory::Sovereign {
            SelectionTrigger::SovereignMandate
        } else if self.thread.attention_forced_at(target_chapter) {
            SelectionTrigger::ForcedAttention
        } else if self.health.payoff_horizon == PayoffHorizon::Overdue {
            SelectionTrigger::OverduePayoff
        } else if self.health.gold_glow {
            SelectionTrigger::PerfectWindow
        } else if self.thread.status == ThreadStatus::Stalled {
            SelectionTrigger::StalledRecovery
        } else {
            SelectionTrigger::UrgencyThreshold
        }
    }

    fn to_selected(&self, trigger: SelectionTrigger) -> SelectedThread {
        SelectedThread {
            thread_id: self.thread.id.clone(),
            title: self.thread.title.clone(),
            category: self.thread.category,
            status: self.thread.status,
            urgency: self.physics.urgency,
            payoff_debt: self.thread.payoff_debt,
            payoff_horizon: self.health.payoff_horizon,
            trigger,
        }
    }

    fn reasoning(&self, trigger: SelectionTrigger) -> String {
        format!(
            "{} ({}): {}, urgency {:.1}, debt {:.1}, {:?}",
            self.thread.id,
            self.thread.category,
            trigger,
            self.physics.urgency,
            self.thread.payoff_debt,
            self.health.payoff_horizon,
        )
    }
}

/// Total order: urgency desc, category rank desc, debt desc, id asc.
fn rank_order(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.physics
        .urgency
        .total_cmp(&a.physics.urgency)
        .then_with(|| b.thread.category.rank().cmp(&a.thread.category.rank()))
        .then_with(|| b.thread.payoff_debt.total_cmp(&a.thread.payoff_debt))
        .then_with(|| a.thread.id.cmp(&b.thread.id))
}

/// Selects primary and secondary threads for `target_chapter`.
///
/// Selection logic:
/// 1. Drop closed, abandoned and intentionally dropped threads
/// 2. Every sovereign thread is primary, then every forced thread
/// 3. Rank the rest by urgency
/// 4. Fill remaining primary slots with ranked threads over the threshold
/// 5. Fill secondary slots from whatever ranks next
///
/// Mandatory threads are never dropped to honor the primary cap; the result
/// is flagged `over_capacity` instead.
pub fn select(threads: &[Thread], target_chapter: u32, config: &LoomConfig) -> ThreadSelectionResult {
    let caps = &config.selection;
    let mut result = ThreadSelectionResult::empty(target_chapter);

    let mut candidates: Vec<Candidate<'_>> = threads
        .iter()
        .filter(|t| !t.is_retired())
        .map(|t| Candidate::evaluate(t, target_chapter, config))
        .collect();
    if candidates.is_empty() {
        return result;
    }
    candidates.sort_by(rank_order);

    let (mut mandatory, ranked): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| c.is_mandatory(target_chapter));
    // Sovereign before forced, rank order kept within each group.
    mandatory.sort_by_key(|c| c.thread.category != ThreadCategory::Sovereign);

    result.over_capacity = mandatory.len() > caps.max_primary_threads;

    for candidate in &mandatory {
        let trigger = candidate.primary_trigger(target_chapter);
        result.reasoning.push(candidate.reasoning(trigger));
        result.primary_threads.push(candidate.to_selected(trigger));
    }

    let mut remaining = ranked.into_iter().peekable();
    while result.primary_threads.len() < caps.max_primary_threads {
        let Some(candidate) =
            remaining.next_if(|c| c.physics.urgency >= caps.primary_urgency_threshold)
        else {
            break;
        };
        let trigger = candidate.primary_trigger(target_chapter);
        result.reasoning.push(candidate.reasoning(trigger));
        result.primary_threads.push(candidate.to_selected(trigger));
    }

    result.secondary_threads = remaining
        .take(caps.max_secondary_threads)
        .map(|c| c.to_selected(SelectionTrigger::Ranked))
        .collect();

    debug!(
        chapter = target_chapter,
        primary = result.primary_threads.len(),
        secondary = result.secondary_threads.len(),
        over_capacity = result.over_capacity,
        "selected threads"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LoomConfig {
        LoomConfig::default()
    }

    fn thread(id: &str, category: ThreadCategory, status: ThreadStatus) -> Thread {
        Thread::new(id, id, category, 50.0, 1).with_status(status)
    }

    #[test]
    fn test_empty_input_gives_empty_result() {
        let result = select(&[], 5, &config());
        assert!(result.is_empty());
        assert_eq!(result.target_chapter, 5);
    }

    #[test]
    fn test_sovereign_always_primary() {
        // Quiet sovereign with near-zero urgency
        let crown = thread("crown", ThreadCategory::Sovereign, ThreadStatus::Active);
        let result = select(&[crown], 1, &config());

        assert!(result.is_primary("crown"));
        assert_eq!(result.primary_threads[0].trigger, SelectionTrigger::SovereignMandate);
        assert_eq!(result.reasoning.len(), 1);
        assert!(result.reasoning[0].contains("sovereign mandate"));
    }

    #[test]
    fn test_terminal_threads_excluded() {
        let closed = thread("closed", ThreadCategory::Sovereign, ThreadStatus::Closed);
        let dropped = thread("dropped", ThreadCategory::Major, ThreadStatus::Abandoned);
        let result = select(&[closed, dropped], 40, &config());
        assert!(result.is_empty());
    }

    #[test]
    fn test_intentionally_abandoned_never_ranked() {
        let mut cut = thread("cut", ThreadCategory::Major, ThreadStatus::Active).with_debt(90.0);
        cut.intentional_abandonment = true;
        let mut crown = thread("crown", ThreadCategory::Sovereign, ThreadStatus::Active);
        crown.intentional_abandonment = true;
        let quiet = thread("quiet", ThreadCategory::Minor, ThreadStatus::Open);

        let result = select(&[cut, crown, quiet], 11, &config());
        assert!(result.primary_threads.is_empty());
        assert_eq!(result.secondary_threads.len(), 1);
        assert!(result.is_secondary("quiet"));
        assert!(!result.is_secondary("cut"));
    }

    #[test]
    fn test_over_capacity_keeps_every_sovereign() {
        let threads: Vec<Thread> = (0..5)
            .map(|i| thread(&format!("s-{}", i), ThreadCategory::Sovereign, ThreadStatus::Active))
            .collect();
        let result = select(&threads, 10, &config());

        assert_eq!(result.primary_threads.len(), 5);
        assert!(result.over_capacity);
    }

    #[test]
    fn test_forced_attention_is_mandatory() {
        let mut locket = thread("locket", ThreadCategory::Seed, ThreadStatus::Seed);
        locket.attention_forced_through = Some(6);

        let result = select(std::slice::from_ref(&locket), 6, &config());
        assert_eq!(result.primary_threads[0].trigger, SelectionTrigger::ForcedAttention);

        let later = select(&[locket], 7, &config());
        assert!(!later.is_primary("locket"));
        assert!(later.is_secondary("locket"));
    }

    #[test]
    fn test_threshold_gates_primary() {
        // Fresh minor thread: urgency ~0, goes to secondary
        let quiet = thread("quiet", ThreadCategory::Minor, ThreadStatus::Open);
        // Heavy debt pushes urgency over the threshold
        let loud = thread("loud", ThreadCategory::Major, ThreadStatus::Active).with_debt(70.0);

        let result = select(&[quiet, loud], 2, &config());
        assert_eq!(result.primary_ids(), vec!["loud"]);
        assert_eq!(result.primary_threads[0].trigger, SelectionTrigger::OverduePayoff);
        assert!(result.is_secondary("quiet"));
        assert_eq!(result.secondary_threads[0].trigger, SelectionTrigger::Ranked);
    }

    #[test]
    fn test_caps_respected() {
        let threads: Vec<Thread> = (0..12)
            .map(|i| {
                thread(&format!("t-{:02}", i), ThreadCategory::Major, ThreadStatus::Active)
                    .with_debt(100.0 + i as f32)
            })
            .collect();
        let result = select(&threads, 2, &config());

        assert_eq!(result.primary_threads.len(), 3);
        assert_eq!(result.secondary_threads.len(), 5);
        // Highest debt first
        assert_eq!(result.primary_ids(), vec!["t-11", "t-10", "t-09"]);
    }

    #[test]
    fn test_ties_break_by_category_then_id() {
        let b = thread("b", ThreadCategory::Minor, ThreadStatus::Open);
        let a = thread("a", ThreadCategory::Minor, ThreadStatus::Open);
        let seed = thread("0-seed", ThreadCategory::Seed, ThreadStatus::Seed);

        let result = select(&[b, seed, a], 1, &config());
        let order: Vec<_> = result.secondary_threads.iter().map(|t| t.thread_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "0-seed"]);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let threads = vec![
            thread("x", ThreadCategory::Major, ThreadStatus::Active).with_debt(12.0),
            thread("y", ThreadCategory::Minor, ThreadStatus::Stalled).with_debt(40.0),
            thread("z", ThreadCategory::Sovereign, ThreadStatus::Blooming),
        ];
        assert_eq!(select(&threads, 20, &config()), select(&threads, 20, &config()));
    }
}
