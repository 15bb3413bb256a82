//! Sample story data for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // loom-events = { path = "../loom-events", features = ["test-fixtures"] }
//!
//! use loom_events::fixtures;
//!
//! let threads = fixtures::sample_threads();
//! ```

use crate::{ProgressMark, RawThread, Thread, ThreadCategory, ThreadStatus};

/// Returns a small story at chapter 30 with one thread of every kind.
///
/// - `crown`: sovereign succession arc, active, recently advanced
/// - `tower`: major mystery, blooming since chapter 22, heavy debt
/// - `ferry`: minor debt subplot, open, untouched since chapter 12
/// - `locket`: seed planted in chapter 2, never mentioned again
/// - `duel`: minor rivalry, closed at chapter 18
/// - `cult`: major subplot the author dropped
pub fn sample_threads() -> Vec<Thread> {
    let mut crown = Thread::new("crown", "Who inherits the Ember Crown", ThreadCategory::Sovereign, 95.0, 1)
        .with_status(ThreadStatus::Active)
        .with_summary("Three claimants, one dying queen");
    crown.last_mentioned_chapter = 29;
    crown.mention_count = 24;
    crown.progress_count = 9;
    crown.progress_log = vec![
        ProgressMark::advance(21),
        ProgressMark::advance(25),
        ProgressMark::advance(29),
    ];
    crown.last_progress_chapter = Some(29);
    crown.last_evaluated_chapter = 29;
    crown.add_participant("char_queen_isra");
    crown.add_participant("char_prince_aled");

    let mut tower = Thread::new("tower", "What sleeps in the locked tower", ThreadCategory::Major, 75.0, 4)
        .with_status(ThreadStatus::Blooming)
        .with_debt(48.0);
    tower.last_mentioned_chapter = 27;
    tower.mention_count = 14;
    tower.progress_count = 5;
    tower.blooming_chapter = Some(22);
    tower.status_since_chapter = 22;
    tower.last_progress_chapter = Some(22);
    tower.last_evaluated_chapter = 29;

    let mut ferry = Thread::new("ferry", "The ferryman's unpaid debt", ThreadCategory::Minor, 35.0, 8)
        .with_status(ThreadStatus::Open)
        .with_debt(6.0);
    ferry.last_mentioned_chapter = 12;
    ferry.mention_count = 3;
    ferry.last_evaluated_chapter = 12;

    let locket = Thread::new("locket", "The locket in the well", ThreadCategory::Seed, 15.0, 2);

    let mut duel = Thread::new("duel", "Aled's rivalry with Corvin", ThreadCategory::Minor, 40.0, 5)
        .with_status(ThreadStatus::Closed);
    duel.last_mentioned_chapter = 18;
    duel.status_since_chapter = 18;

    let mut cult = Thread::new("cult", "The ashen cult", ThreadCategory::Major, 60.0, 6)
        .with_status(ThreadStatus::Abandoned);
    cult.intentional_abandonment = true;
    cult.abandonment_reason = Some("cut in second draft".to_string());

    vec![crown, tower, ferry, locket, duel, cult]
}

/// Returns raw records in the shape a legacy tracker would export.
pub fn sample_raw_threads() -> Vec<RawThread> {
    vec![
        RawThread::new("plot-1", "The queen's last letter")
            .with_category("critical")
            .with_chapters(1, 14),
        RawThread::new("plot-2", "A debt of salt")
            .with_category("side")
            .with_chapters(3, 3),
        RawThread {
            resolved: true,
            ..RawThread::new("plot-3", "The bridge collapse").with_chapters(2, 9)
        },
        RawThread {
            title: None,
            ..RawThread::new("plot-4", "")
        },
    ]
}
