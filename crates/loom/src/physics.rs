//! Thread physics.
//!
//! Every quantity is a pure function of the stored thread and the current
//! chapter. Out-of-range history is clamped before use so corrupt records
//! never abort a pass:
//!
//! - `distance = current - last_mentioned`
//! - `mass = karma_weight`
//! - `velocity = (advances - regressions) / window` over recent chapters
//! - `entropy = distance * k + noise(mentions / progress)`, bounded to [0, 100]
//! - `gravity = mass * (1 - e^(-distance / scale))`
//! - `urgency = gravity * category_weight + debt * debt_weight (+ forced boost)`

use loom_events::{ProgressKind, Thread, ThreadPhysics};

use crate::config::PhysicsConfig;

/// Chapter bookkeeping after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChapterSpan {
    pub current: u32,
    pub first: u32,
    pub last_mentioned: u32,
}

impl ChapterSpan {
    /// Enforces `first <= last_mentioned <= current`.
    pub(crate) fn of(thread: &Thread, current_chapter: u32) -> Self {
        let first = thread.first_chapter.min(current_chapter);
        let last_mentioned = thread.last_mentioned_chapter.clamp(first, current_chapter);
        Self {
            current: current_chapter,
            first,
            last_mentioned,
        }
    }

    pub(crate) fn distance(&self) -> u32 {
        self.current - self.last_mentioned
    }

    pub(crate) fn age(&self) -> u32 {
        self.current - self.first
    }
}

/// Computes a thread's physical quantities at `current_chapter`.
pub fn compute(thread: &Thread, current_chapter: u32, config: &PhysicsConfig) -> ThreadPhysics {
    let span = ChapterSpan::of(thread, current_chapter);
    let distance = span.distance();
    let mass = sanitize(thread.karma_weight).clamp(0.0, 100.0);

    let velocity = velocity(thread, &span, config.velocity_window_chapters);
    let entropy = entropy(thread, distance, config);
    let gravity = gravity(mass, distance, config.gravity_distance_scale);

    let forced_boost = if thread.attention_forced_at(current_chapter) {
        config.force_attention_boost.max(0.0)
    } else {
        0.0
    };
    let debt = sanitize(thread.payoff_debt).max(0.0);
    let urgency = (gravity * config.category_weights.get(thread.category)
        + debt * config.debt_weight
        + forced_boost)
        .max(0.0);

    ThreadPhysics {
        chapter: current_chapter,
        mass,
        velocity,
        entropy,
        distance,
        gravity,
        urgency,
    }
}

/// Net progression per chapter over the trailing window.
fn velocity(thread: &Thread, span: &ChapterSpan, window_chapters: u32) -> f32 {
    let window = window_chapters.max(1).min(span.age().saturating_add(1));

    if thread.progress_log.is_empty() {
        // Legacy records carry counts but no chapter stamps.
        return thread.progress_count as f32 / (span.age() as f32 + 1.0);
    }

    let window_start = span.current - (window - 1);
    let net: i64 = thread
        .progress_log
        .iter()
        .filter(|mark| mark.chapter >= window_start && mark.chapter <= span.current)
        .map(|mark| match mark.kind {
            ProgressKind::Advance => 1,
            ProgressKind::Regress => -1,
        })
        .sum();

    net as f32 / window as f32
}

fn entropy(thread: &Thread, distance: u32, config: &PhysicsConfig) -> f32 {
    let silence = distance as f32 * config.entropy_per_silent_chapter;
    let ratio = thread.mention_count as f32 / (thread.progress_count as f32 + 1.0);
    let noise = (ratio - 1.0).max(0.0) * config.entropy_noise_weight;
    sanitize(silence + noise).clamp(0.0, 100.0)
}

/// Saturating pull: zero at distance 0, approaches `mass` as silence grows.
pub fn gravity(mass: f32, distance: u32, scale: f32) -> f32 {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    mass * (1.0 - (-(distance as f32) / scale).exp())
}

fn sanitize(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}
