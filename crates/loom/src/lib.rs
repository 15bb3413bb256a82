//! The Loom: narrative-thread prioritization.
//!
//! The Loom sits beside an author (or a generation pipeline). It tracks every
//! open storyline, measures how strongly each one is pulling on the story,
//! and decides which threads the next chapter must carry so that no promise
//! is forgotten and sovereign arcs are never skipped.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  raw threads   ┌──────┐   LoomReport (json / jsonl)
//! │ host / tools │ ─────────────▶ │ loom │ ─────────────────────────▶
//! └──────────────┘  events, cmds  └──────┘
//! ```
//!
//! # Modules
//!
//! - [`ingest`]: Normalization of raw thread records
//! - [`physics`]: Distance, mass, velocity, entropy, gravity, urgency
//! - [`health`]: Health score, pulse and payoff horizon
//! - [`transitions`]: Lifecycle state machine and payoff-debt accrual
//! - [`selection`]: Primary/secondary thread selection per chapter
//! - [`aggregate`]: Story-wide health
//! - [`interventions`]: Author commands
//! - [`ledger`]: Id-ordered thread registry
//! - [`report`]: Evaluation reports and JSON Lines output

pub mod aggregate;
pub mod config;
pub mod health;
pub mod ingest;
pub mod interventions;
pub mod ledger;
pub mod physics;
pub mod report;
pub mod selection;
pub mod transitions;

// Re-export config types
pub use config::{
    default_config_toml, CategoryWeights, ConfigError, HealthConfig, IngestConfig, LoomConfig,
    PhysicsConfig, SelectionConfig, TomlSerializeError, TransitionConfig,
};

// Re-export engine types
pub use ingest::{IngestBatch, IngestError};
pub use interventions::{AppliedIntervention, InterventionError};
pub use ledger::{LedgerError, ThreadLedger};
pub use report::{LoomReport, ReportError, ReportReader, ReportWriter, ThreadReport};
pub use transitions::TransitionError;

use std::path::Path;

use loom_events::{
    Intervention, NarrativeEvent, RawThread, StatusChange, Thread, ThreadSelectionResult,
};
use tracing::info;

/// Errors that can occur in Loom operations.
#[derive(Debug)]
pub enum LoomError {
    /// Error loading configuration
    Config(ConfigError),
    /// Error writing or reading reports
    Report(ReportError),
}

impl std::fmt::Display for LoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoomError::Config(e) => write!(f, "Config error: {}", e),
            LoomError::Report(e) => write!(f, "Report error: {}", e),
        }
    }
}

impl std::error::Error for LoomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoomError::Config(e) => Some(e),
            LoomError::Report(e) => Some(e),
        }
    }
}

impl From<ConfigError> for LoomError {
    fn from(e: ConfigError) -> Self {
        LoomError::Config(e)
    }
}

impl From<ReportError> for LoomError {
    fn from(e: ReportError) -> Self {
        LoomError::Report(e)
    }
}

/// Entry point tying the engine together under one configuration.
///
/// The Loom holds no thread state of its own; callers own their threads
/// (or a [`ThreadLedger`]) and pass them in. Evaluation never mutates.
#[derive(Debug, Clone, Default)]
pub struct Loom {
    config: LoomConfig,
}

impl Loom {
    /// Creates a Loom with the given configuration.
    pub fn new(config: LoomConfig) -> Self {
        Self { config }
    }

    /// Creates a Loom from a configuration file.
    pub fn from_config_file(path: &Path) -> Result<Self, LoomError> {
        let config = LoomConfig::from_file(path)?;
        Ok(Self::new(config))
    }

    /// Creates a Loom with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LoomConfig::default())
    }

    pub fn config(&self) -> &LoomConfig {
        &self.config
    }

    /// Normalizes raw records at `chapter`.
    pub fn ingest(&self, raws: &[RawThread], chapter: u32) -> IngestBatch {
        let batch = ingest::normalize_all(raws, chapter, &self.config.ingest);
        info!(
            chapter,
            admitted = batch.admitted.len(),
            rejected = batch.rejected.len(),
            "ingested thread records"
        );
        batch
    }

    /// Evaluates every thread at `chapter` and selects for the chapter after.
    ///
    /// This is the main read-only entry point. It:
    /// 1. Computes physics and health for every thread (terminal ones too)
    /// 2. Selects primary and secondary threads for `chapter + 1`
    /// 3. Aggregates story health over open threads
    pub fn evaluate(&self, threads: &[Thread], chapter: u32) -> LoomReport {
        let reports = threads
            .iter()
            .map(|thread| {
                let physics = physics::compute(thread, chapter, &self.config.physics);
                let health = health::evaluate(thread, &physics, &self.config.health);
                ThreadReport {
                    thread_id: thread.id.clone(),
                    status: thread.status,
                    physics,
                    health,
                }
            })
            .collect();

        LoomReport {
            chapter,
            threads: reports,
            selection: self.select(threads, chapter.saturating_add(1)),
            overall_health: aggregate::overall_health(threads, chapter, &self.config),
            terminal_count: threads.iter().filter(|t| t.is_terminal()).count(),
            status_changes: Vec::new(),
        }
    }

    /// Selects threads for `target_chapter`.
    pub fn select(&self, threads: &[Thread], target_chapter: u32) -> ThreadSelectionResult {
        selection::select(threads, target_chapter, &self.config)
    }

    /// Story-wide health at `chapter`.
    pub fn overall_health(&self, threads: &[Thread], chapter: u32) -> f32 {
        aggregate::overall_health(threads, chapter, &self.config)
    }

    /// Advances every thread to `chapter`; at most one change per thread.
    pub fn advance_chapter(&self, threads: &mut [Thread], chapter: u32) -> Vec<StatusChange> {
        let changes: Vec<StatusChange> = threads
            .iter_mut()
            .filter_map(|thread| transitions::advance(thread, chapter, &self.config))
            .collect();
        info!(chapter, changes = changes.len(), "advanced chapter");
        changes
    }

    /// Applies a narrative event to one thread.
    pub fn record(
        &self,
        thread: &mut Thread,
        event: NarrativeEvent,
    ) -> Result<Option<StatusChange>, TransitionError> {
        transitions::record(thread, event, &self.config)
    }

    /// Applies an author intervention to one thread.
    pub fn apply(
        &self,
        thread: &mut Thread,
        intervention: &Intervention,
        chapter: u32,
    ) -> Result<AppliedIntervention, InterventionError> {
        interventions::apply(thread, intervention, chapter)
    }
}
