//! Derived per-thread quantities.
//!
//! These are projections of a [`Thread`](crate::Thread) at a given chapter.
//! They are plain data so hosts can serialize them, but nothing writes them
//! back onto the thread record.

use serde::{Deserialize, Serialize};

/// Instantaneous physical state of a thread at one chapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreadPhysics {
    /// Chapter these quantities were computed for
    pub chapter: u32,
    /// Authorial weight, 0 to 100
    pub mass: f32,
    /// Net progression rate per chapter over the recent window
    pub velocity: f32,
    /// Narrative noise, 0 to 100
    pub entropy: f32,
    /// Chapters of silence since the last mention
    pub distance: u32,
    /// Pull toward resolution, grows with mass and silence
    pub gravity: f32,
    /// Ranking key, never negative
    pub urgency: f32,
}

/// Payoff timing classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayoffHorizon {
    /// Still accumulating weight
    #[default]
    Building,
    /// Resolution is due but not late
    PerfectWindow,
    /// Past the window
    Overdue,
}

/// Coarse vitality band for dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PulseLevel {
    Flatline,
    Faint,
    #[default]
    Steady,
    Strong,
}

impl PulseLevel {
    /// Maps a 0-100 health score to a pulse band.
    pub fn from_score(score: f32) -> Self {
        if score >= 75.0 {
            PulseLevel::Strong
        } else if score >= 50.0 {
            PulseLevel::Steady
        } else if score >= 25.0 {
            PulseLevel::Faint
        } else {
            PulseLevel::Flatline
        }
    }
}

/// Health lens over a thread's physics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreadHealth {
    /// 0 to 100
    pub health_score: f32,
    pub pulse_level: PulseLevel,
    /// Entropy is critically high
    pub crack_effect: bool,
    /// Blooming and inside the perfect window: resolve now
    pub gold_glow: bool,
    pub payoff_horizon: PayoffHorizon,
}
