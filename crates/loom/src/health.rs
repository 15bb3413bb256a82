//! Health lens over thread physics.
//!
//! Read-only: maps physics plus status to a bounded score, presentation
//! hints, and the payoff horizon.

use loom_events::{PayoffHorizon, PulseLevel, Thread, ThreadHealth, ThreadPhysics, ThreadStatus};

use crate::config::HealthConfig;

/// Evaluates a thread's health from its physics.
pub fn evaluate(thread: &Thread, physics: &ThreadPhysics, config: &HealthConfig) -> ThreadHealth {
    let health_score = (100.0 - physics.entropy * config.entropy_penalty
        - physics.distance as f32 * config.distance_penalty
        + physics.velocity.max(0.0) * config.velocity_bonus)
        .clamp(0.0, 100.0);

    let pulse_level = if thread.is_terminal() {
        PulseLevel::Flatline
    } else {
        PulseLevel::from_score(health_score)
    };

    let payoff_horizon = payoff_horizon(thread, physics, config);

    ThreadHealth {
        health_score,
        pulse_level,
        crack_effect: physics.entropy >= config.critical_entropy,
        gold_glow: thread.status == ThreadStatus::Blooming
            && payoff_horizon == PayoffHorizon::PerfectWindow,
        payoff_horizon,
    }
}

/// Classifies where a thread sits relative to its resolution window.
pub fn payoff_horizon(thread: &Thread, physics: &ThreadPhysics, config: &HealthConfig) -> PayoffHorizon {
    let debt = thread.payoff_debt.max(0.0);

    let bloomed_too_long = thread
        .blooming_chapter
        .is_some_and(|bloomed| physics.chapter.saturating_sub(bloomed) > config.perfect_window_chapters);

    if debt > config.overdue_debt || bloomed_too_long {
        PayoffHorizon::Overdue
    } else if in_payoff_window(thread, physics, config) {
        PayoffHorizon::PerfectWindow
    } else {
        PayoffHorizon::Building
    }
}

/// True once debt or gravity says resolution is narratively due.
///
/// This is also the Active -> Blooming trigger.
pub fn in_payoff_window(thread: &Thread, physics: &ThreadPhysics, config: &HealthConfig) -> bool {
    thread.status == ThreadStatus::Blooming
        || thread.payoff_debt >= config.window_debt
        || physics.gravity >= config.window_gravity
}
