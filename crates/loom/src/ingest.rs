//! Admission of raw thread records.
//!
//! Normalizes externally sourced records into [`Thread`]s, filling every
//! missing field with a safe default. Records without identity are
//! rejected; corrupt chapter history is clamped and logged.

use loom_events::{
    clamp_karma, derive_signature, RawThread, Thread, ThreadCategory, ThreadStatus,
};
use thiserror::Error;
use tracing::warn;

use crate::config::IngestConfig;

/// Validation failures at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("thread record has no id")]
    MissingId,
    #[error("thread {id} has no title")]
    MissingTitle { id: String },
}

/// Outcome of admitting a batch of records.
#[derive(Debug, Clone, Default)]
pub struct IngestBatch {
    pub admitted: Vec<Thread>,
    /// Index into the input batch and the reason it was refused
    pub rejected: Vec<(usize, IngestError)>,
}

/// Normalizes one raw record at `current_chapter`.
pub fn normalize(
    raw: &RawThread,
    current_chapter: u32,
    config: &IngestConfig,
) -> Result<Thread, IngestError> {
    let id = non_blank(raw.id.as_deref()).ok_or(IngestError::MissingId)?;
    let title = non_blank(raw.title.as_deref()).ok_or_else(|| IngestError::MissingTitle {
        id: id.to_string(),
    })?;

    let category = match raw.category.as_deref() {
        Some(label) => ThreadCategory::parse(label).unwrap_or_else(|| {
            warn!(thread = id, label, "unknown category, defaulting to minor");
            ThreadCategory::Minor
        }),
        None => ThreadCategory::Minor,
    };

    let karma_weight = match raw.karma_weight.filter(|k| k.is_finite()) {
        Some(supplied) => supplied + config.karma_bias.get(category),
        None => config.default_karma.get(category),
    };
    let karma_weight = clamp_karma(karma_weight);

    let first_chapter = match raw.first_chapter {
        Some(first) => clamp_chapter(id, "first_chapter", first, current_chapter),
        None => current_chapter,
    };
    let mut last_mentioned_chapter = match raw.last_mentioned_chapter {
        Some(last) => clamp_chapter(id, "last_mentioned_chapter", last, current_chapter),
        None => first_chapter,
    };
    if last_mentioned_chapter < first_chapter {
        warn!(
            thread = id,
            first_chapter, last_mentioned_chapter, "last mention precedes introduction, lifting"
        );
        last_mentioned_chapter = first_chapter;
    }


    let payoff_debt = match raw.payoff_debt {
        Some(debt) if debt.is_finite() && debt >= 0.0 => debt,
        Some(debt) => {
            warn!(thread = id, debt, "invalid payoff debt, resetting to zero");
            0.0
        }
        None => 0.0,
    };

    let mut progress_log = raw.progress_log.clone();
    for mark in &mut progress_log {
        mark.chapter = mark.chapter.clamp(first_chapter, current_chapter);
    }
    progress_log.sort_by_key(|mark| mark.chapter);
    let last_progress_chapter = progress_log.last().map(|mark| mark.chapter);
    if let Some(progressed) = last_progress_chapter.filter(|&c| c > last_mentioned_chapter) {
        warn!(thread = id, progressed, "progress logged after last mention, lifting");
        last_mentioned_chapter = progressed;
    }

    // The introduction itself counts as a mention.
    let mention_count = count(id, "mention_count", raw.mention_count).max(1);
    let progress_count = count(id, "progress_count", raw.progress_count);

    let status = infer_status(raw, id, first_chapter, last_mentioned_chapter);

    let mut blooming_chapter = raw
        .blooming_chapter
        .map(|c| clamp_chapter(id, "blooming_chapter", c, current_chapter));
    if status == ThreadStatus::Blooming && blooming_chapter.is_none() {
        warn!(
            thread = id,
            stamped = last_mentioned_chapter,
            "blooming without a blooming chapter, stamping at last mention"
        );
        blooming_chapter = Some(last_mentioned_chapter);
    }

    let mut participants: Vec<String> = Vec::with_capacity(raw.participants.len());
    for participant in &raw.participants {
        if !participants.contains(participant) {
            participants.push(participant.clone());
        }
    }

    let signature = match non_blank(raw.signature.as_deref()) {
        Some(signature) => signature.to_string(),
        None => derive_signature(title),
    };

    Ok(Thread {
        id: id.to_string(),
        title: title.to_string(),
        signature,
        category,
        status,
        karma_weight,
        payoff_debt,
        first_chapter,
        last_mentioned_chapter,
        blooming_chapter,
        mention_count,
        progress_count,
        progress_log,
        last_progress_chapter,
        // Imported status is taken as observed at the last touch.
        status_since_chapter: last_mentioned_chapter,
        progress_at_status_change: progress_count,
        last_evaluated_chapter: last_mentioned_chapter,
        attention_forced_through: None,
        summary: raw.summary.clone().unwrap_or_default(),
        resolution_criteria: raw.resolution_criteria.clone().unwrap_or_default(),
        participants,
        intentional_abandonment: raw.intentional_abandonment,
        abandonment_reason: None,
    })
}

/// Normalizes a batch, never partially admitting an invalid record.
pub fn normalize_all(raws: &[RawThread], current_chapter: u32, config: &IngestConfig) -> IngestBatch {
    let mut batch = IngestBatch::default();
    for (index, raw) in raws.iter().enumerate() {
        match normalize(raw, current_chapter, config) {
            Ok(thread) => batch.admitted.push(thread),
            Err(e) => {
                warn!(index, error = %e, "rejected thread record");
                batch.rejected.push((index, e));
            }
        }
    }
    batch
}

fn infer_status(raw: &RawThread, id: &str, first: u32, last_mentioned: u32) -> ThreadStatus {
    let labelled = raw.status.as_deref().and_then(|label| {
        let parsed = ThreadStatus::parse(label);
        if parsed.is_none() {
            warn!(thread = id, label, "unknown status, inferring from history");
        }
        parsed
    });

    match labelled {
        // An author's abandonment outranks any live status on the record.
        Some(status) if raw.intentional_abandonment && !status.is_terminal() => {
            warn!(thread = id, %status, "intentionally abandoned thread, forcing abandoned");
            ThreadStatus::Abandoned
        }
        Some(status) => status,
        None if raw.resolved => ThreadStatus::Closed,
        None if raw.intentional_abandonment => ThreadStatus::Abandoned,
        None if last_mentioned > first => ThreadStatus::Open,
        None => ThreadStatus::Seed,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn clamp_chapter(id: &str, field: &'static str, value: i64, current_chapter: u32) -> u32 {
    let clamped = value.clamp(0, i64::from(current_chapter));
    if clamped != value {
        warn!(thread = id, field, value, clamped, "chapter out of range");
    }
    // In range after the clamp above.
    clamped as u32
}

fn count(id: &str, field: &'static str, value: Option<i64>) -> u32 {
    let value = value.unwrap_or(0);
    let clamped = value.clamp(0, i64::from(u32::MAX));
    if clamped != value {
        warn!(thread = id, field, value, "count out of range");
    }
    clamped as u32
}
