//! Story-wide health.

use loom_events::Thread;

use crate::config::LoomConfig;
use crate::{health, physics};

/// Category-weighted mean health over threads still in play.
///
/// Returns 100 when nothing is left open.
pub fn overall_health(threads: &[Thread], current_chapter: u32, config: &LoomConfig) -> f32 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;

    for thread in threads.iter().filter(|t| !t.is_retired()) {
        let weight = config.physics.category_weights.get(thread.category).max(0.0);
        let physics = physics::compute(thread, current_chapter, &config.physics);
        let score = health::evaluate(thread, &physics, &config.health).health_score;
        weighted += score * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        (weighted / total_weight).clamp(0.0, 100.0)
    } else {
        100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_events::{ThreadCategory, ThreadStatus};

    #[test]
    fn test_no_open_threads_is_full_health() {
        let config = LoomConfig::default();
        assert_eq!(overall_health(&[], 10, &config), 100.0);

        let closed = Thread::new("t-1", "Done", ThreadCategory::Major, 50.0, 1)
            .with_status(ThreadStatus::Closed);
        assert_eq!(overall_health(&[closed], 90, &config), 100.0);
    }

    #[test]
    fn test_intentionally_abandoned_left_out() {
        let config = LoomConfig::default();
        let crown = Thread::new("crown", "Crown", ThreadCategory::Sovereign, 90.0, 60);
        let mut cut = Thread::new("cut", "Cut", ThreadCategory::Major, 60.0, 1)
            .with_status(ThreadStatus::Active);
        cut.intentional_abandonment = true;

        assert_eq!(overall_health(&[crown, cut], 60, &config), 100.0);
    }

    #[test]
    fn test_weighted_toward_important_threads() {
        let config = LoomConfig::default();
        // Sovereign fresh (100), seed neglected (0)
        let crown = Thread::new("crown", "Crown", ThreadCategory::Sovereign, 90.0, 60);
        let locket = Thread::new("locket", "Locket", ThreadCategory::Seed, 15.0, 1);

        let health = overall_health(&[crown, locket], 60, &config);
        // (100 * 3 + 0 * 0.5) / 3.5
        assert!((health - 85.714).abs() < 0.01);
    }
}
