//! In-memory thread registry.
//!
//! Keyed by thread id in a `BTreeMap` so iteration order, and therefore
//! every derived report, is stable across runs.

use std::collections::BTreeMap;

use loom_events::{Intervention, NarrativeEvent, StatusChange, Thread};
use thiserror::Error;

use crate::config::LoomConfig;
use crate::interventions::{self, AppliedIntervention, InterventionError};
use crate::transitions::{self, TransitionError};

/// Errors raised by ledger operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("thread {0} is already registered")]
    DuplicateId(String),
    #[error("no thread with id {0}")]
    UnknownThread(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Intervention(#[from] InterventionError),
}

/// Registry of every thread in a story.
#[derive(Debug, Clone, Default)]
pub struct ThreadLedger {
    threads: BTreeMap<String, Thread>,
}

impl ThreadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a normalized thread. Ids are never reused.
    pub fn ingest(&mut self, thread: Thread) -> Result<(), LedgerError> {
        if self.threads.contains_key(&thread.id) {
            return Err(LedgerError::DuplicateId(thread.id));
        }
        self.threads.insert(thread.id.clone(), thread);
        Ok(())
    }

    pub fn get(&self, thread_id: &str) -> Option<&Thread> {
        self.threads.get(thread_id)
    }

    /// Applies a narrative event to one thread.
    pub fn record(
        &mut self,
        thread_id: &str,
        event: NarrativeEvent,
        config: &LoomConfig,
    ) -> Result<Option<StatusChange>, LedgerError> {
        let thread = self.get_mut(thread_id)?;
        Ok(transitions::record(thread, event, config)?)
    }

    /// Advances every thread to `chapter`, in id order.
    pub fn advance_all(&mut self, chapter: u32, config: &LoomConfig) -> Vec<StatusChange> {
        self.threads
            .values_mut()
            .filter_map(|thread| transitions::advance(thread, chapter, config))
            .collect()
    }

    /// Routes an intervention to its target thread.
    pub fn apply_intervention(
        &mut self,
        intervention: &Intervention,
        chapter: u32,
    ) -> Result<AppliedIntervention, LedgerError> {
        let thread = self.get_mut(&intervention.thread_id)?;
        Ok(interventions::apply(thread, intervention, chapter)?)
    }

    /// All threads in id order.
    pub fn threads(&self) -> Vec<&Thread> {
        self.threads.values().collect()
    }

    /// Non-terminal threads in id order.
    pub fn active(&self) -> Vec<&Thread> {
        self.threads.values().filter(|t| !t.is_terminal()).collect()
    }

    /// Owned copy of every thread, for passes that take a slice.
    pub fn snapshot(&self) -> Vec<Thread> {
        self.threads.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    fn get_mut(&mut self, thread_id: &str) -> Result<&mut Thread, LedgerError> {
        self.threads
            .get_mut(thread_id)
            .ok_or_else(|| LedgerError::UnknownThread(thread_id.to_string()))
    }
}

impl FromIterator<Thread> for ThreadLedger {
    /// Later duplicates are dropped.
    fn from_iter<I: IntoIterator<Item = Thread>>(iter: I) -> Self {
        let mut ledger = Self::new();
        for thread in iter {
            ledger.threads.entry(thread.id.clone()).or_insert(thread);
        }
        ledger
    }
}
