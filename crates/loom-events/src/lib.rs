//! Shared thread types and serialization for the Loom.
//!
//! This crate contains pure data structures with no scheduling logic.
//! It is a dependency for all other crates in the workspace and the
//! boundary type set a host application persists and exchanges.

pub mod command;
pub mod metrics;
pub mod raw;
pub mod selection;
pub mod thread;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export thread types
pub use thread::{
    clamp_karma, derive_signature, ProgressKind, ProgressMark, Thread, ThreadCategory, ThreadStatus,
};

// Re-export raw record type
pub use raw::RawThread;

// Re-export derived metric types
pub use metrics::{PayoffHorizon, PulseLevel, ThreadHealth, ThreadPhysics};

// Re-export selection types
pub use selection::{SelectedThread, SelectionTrigger, ThreadSelectionResult};

// Re-export command types
pub use command::{Intervention, InterventionKind, NarrativeEvent, StatusChange};
