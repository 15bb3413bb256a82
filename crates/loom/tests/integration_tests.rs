//! Integration tests for the Loom.
//!
//! These tests use sample story fixtures to verify the full pipeline
//! (ingest, advance, evaluate, report) works end-to-end.

use loom::{Loom, LoomReport, ReportReader, ReportWriter, ThreadLedger};
use loom_events::{
    fixtures, Intervention, NarrativeEvent, PayoffHorizon, RawThread, SelectionTrigger, Thread,
    ThreadCategory, ThreadStatus,
};
use std::fs;
use tempfile::tempdir;

/// Load raw thread records from the fixture file.
fn load_sample_records() -> Vec<RawThread> {
    let content = fs::read_to_string("tests/fixtures/sample_threads.json")
        .expect("Failed to read thread records");
    RawThread::parse_batch(&content).expect("Failed to parse thread records")
}

fn ingest_sample(loom: &Loom, chapter: u32) -> ThreadLedger {
    let batch = loom.ingest(&load_sample_records(), chapter);
    batch.admitted.into_iter().collect()
}

#[test]
fn test_fixture_records_ingest() {
    let loom = Loom::with_defaults();
    let batch = loom.ingest(&load_sample_records(), 24);

    assert_eq!(batch.admitted.len(), 5);
    assert_eq!(batch.rejected.len(), 1);
    assert_eq!(batch.rejected[0].0, 5);

    let queen = &batch.admitted[0];
    assert_eq!(queen.category, ThreadCategory::Sovereign);
    assert_eq!(queen.status, ThreadStatus::Active);
    assert_eq!(queen.karma_weight, 100.0);
    assert_eq!(queen.last_progress_chapter, Some(22));

    let bridge = batch.admitted.iter().find(|t| t.id == "bridge").unwrap();
    assert_eq!(bridge.status, ThreadStatus::Closed);
}

#[test]
fn test_full_pipeline_from_records() {
    let loom = Loom::with_defaults();
    let ledger = ingest_sample(&loom, 24);
    let report = loom.evaluate(&ledger.snapshot(), 24);

    assert_eq!(report.threads.len(), 5);
    assert_eq!(report.terminal_count, 1);
    assert_eq!(report.selection.target_chapter, 25);
    assert_eq!(report.selection.primary_ids(), vec!["queen-letter", "tower"]);

    let secondary: Vec<_> = report
        .selection
        .secondary_threads
        .iter()
        .map(|t| t.thread_id.as_str())
        .collect();
    assert_eq!(secondary, vec!["salt-debt", "well-locket"]);
    assert!(!report.selection.is_primary("bridge"));
    assert!(!report.selection.is_secondary("bridge"));
}

#[test]
fn test_sample_story_selection() {
    let loom = Loom::with_defaults();
    let threads = fixtures::sample_threads();
    let report = loom.evaluate(&threads, 30);

    assert_eq!(report.terminal_count, 2);
    assert_eq!(report.selection.primary_ids(), vec!["crown", "tower"]);
    assert_eq!(
        report.selection.primary_threads[0].trigger,
        SelectionTrigger::SovereignMandate
    );
    assert_eq!(
        report.selection.primary_threads[1].trigger,
        SelectionTrigger::OverduePayoff
    );
    assert!(report.selection.is_secondary("ferry"));
    assert!(report.selection.is_secondary("locket"));
    assert_eq!(report.selection.reasoning.len(), 2);
}

#[test]
fn test_untouched_seed_stalls_and_stays_out_of_primary() {
    let loom = Loom::with_defaults();
    let mut threads = vec![Thread::new(
        "locket",
        "The locket in the well",
        ThreadCategory::Seed,
        15.0,
        1,
    )];

    let mut stalled_at = None;
    for chapter in 2..=40 {
        for change in loom.advance_chapter(&mut threads, chapter) {
            assert_eq!(change.to, ThreadStatus::Stalled);
            stalled_at.get_or_insert(chapter);
        }
    }

    assert!(stalled_at.is_some_and(|chapter| chapter <= 12));
    assert_eq!(threads[0].status, ThreadStatus::Stalled);

    let report = loom.evaluate(&threads, 40);
    assert_eq!(report.thread("locket").unwrap().physics.distance, 39);

    let selection = loom.select(&threads, 40);
    assert!(!selection.is_primary("locket"));
    assert!(selection.is_secondary("locket"));

    // The same neglect on a sovereign thread is never skipped.
    threads[0].category = ThreadCategory::Sovereign;
    let selection = loom.select(&threads, 40);
    assert!(selection.is_primary("locket"));
}

#[test]
fn test_overdue_blooming_major_is_high_priority() {
    let loom = Loom::with_defaults();
    let mut tower = Thread::new("tower", "The tower", ThreadCategory::Major, 70.0, 4)
        .with_status(ThreadStatus::Blooming)
        .with_debt(72.0);
    tower.blooming_chapter = Some(20);
    tower.last_mentioned_chapter = 29;

    let report = loom.evaluate(std::slice::from_ref(&tower), 30);
    let health = &report.thread("tower").unwrap().health;
    assert_eq!(health.payoff_horizon, PayoffHorizon::Overdue);
    assert!(!health.gold_glow);

    let selected = &report.selection.primary_threads[0];
    assert_eq!(selected.thread_id, "tower");
    assert_eq!(selected.trigger, SelectionTrigger::OverduePayoff);
    assert!(report.selection.reasoning[0].contains("overdue payoff"));
}

#[test]
fn test_dropped_thread_is_never_ranked() {
    let loom = Loom::with_defaults();
    let cut = RawThread {
        status: Some("active".to_string()),
        intentional_abandonment: true,
        payoff_debt: Some(90.0),
        ..RawThread::new("cut", "The ashen cult").with_category("major")
    };
    let batch = loom.ingest(&[cut, RawThread::new("ferry", "The ferryman")], 10);
    assert_eq!(batch.admitted[0].status, ThreadStatus::Abandoned);

    let report = loom.evaluate(&batch.admitted, 10);
    assert!(!report.selection.is_primary("cut"));
    assert!(!report.selection.is_secondary("cut"));
    assert!(report.selection.is_secondary("ferry"));
    assert_eq!(report.terminal_count, 1);
}

#[test]
fn test_imported_blooming_thread_goes_overdue() {
    let loom = Loom::with_defaults();
    let raw = RawThread {
        status: Some("blooming".to_string()),
        ..RawThread::new("tower", "What sleeps in the tower")
            .with_category("major")
            .with_chapters(1, 5)
    };
    let threads = loom.ingest(&[raw], 5).admitted;

    let early = loom.evaluate(&threads, 6);
    assert_eq!(early.thread("tower").unwrap().health.payoff_horizon, PayoffHorizon::PerfectWindow);
    assert!(early.thread("tower").unwrap().health.gold_glow);

    let late = loom.evaluate(&threads, 200);
    let health = &late.thread("tower").unwrap().health;
    assert_eq!(health.payoff_horizon, PayoffHorizon::Overdue);
    assert!(!health.gold_glow);
}

#[test]
fn test_empty_story() {
    let loom = Loom::with_defaults();
    let report = loom.evaluate(&[], 12);

    assert!(report.selection.is_empty());
    assert!(report.selection.reasoning.is_empty());
    assert_eq!(report.overall_health, 100.0);
}

#[test]
fn test_ledger_story_over_many_chapters() {
    let loom = Loom::with_defaults();
    let config = loom.config().clone();
    let mut ledger = ThreadLedger::new();

    ledger
        .ingest(Thread::new("crown", "Crown", ThreadCategory::Sovereign, 90.0, 1))
        .unwrap();
    ledger
        .ingest(Thread::new("tower", "Tower", ThreadCategory::Major, 70.0, 1))
        .unwrap();

    ledger.record("tower", NarrativeEvent::Mention { chapter: 3 }, &config).unwrap();
    ledger.advance_all(3, &config);
    assert_eq!(ledger.get("tower").unwrap().status, ThreadStatus::Open);

    ledger.record("tower", NarrativeEvent::Progress { chapter: 4 }, &config).unwrap();
    ledger.record("tower", NarrativeEvent::Progress { chapter: 5 }, &config).unwrap();
    ledger.advance_all(5, &config);
    assert_eq!(ledger.get("tower").unwrap().status, ThreadStatus::Active);

    ledger
        .apply_intervention(&Intervention::force_attention("tower"), 5)
        .unwrap();
    let selection = loom.select(&ledger.snapshot(), 6);
    assert_eq!(selection.primary_ids(), vec!["crown", "tower"]);
    assert_eq!(selection.primary_threads[1].trigger, SelectionTrigger::ForcedAttention);

    ledger.record("tower", NarrativeEvent::Resolve { chapter: 9 }, &config).unwrap();
    assert!(ledger
        .record("tower", NarrativeEvent::Mention { chapter: 10 }, &config)
        .is_err());
    assert_eq!(ledger.active().len(), 1);
}

#[test]
fn test_report_round_trip_through_jsonl() {
    let dir = tempdir().unwrap();
    let loom = Loom::with_defaults();
    let mut threads = fixtures::sample_threads();

    let mut writer = ReportWriter::new(dir.path()).unwrap();
    for chapter in 30..=33 {
        let changes = loom.advance_chapter(&mut threads, chapter);
        let report = loom.evaluate(&threads, chapter).with_changes(changes);
        writer.write(&report).unwrap();
    }
    writer.flush().unwrap();

    let reports: Vec<LoomReport> = ReportReader::from_dir(dir.path()).read_all().unwrap();
    assert_eq!(reports.len(), 4);
    assert_eq!(reports.last().unwrap().chapter, 33);

    let fresh = loom.evaluate(&threads, 33);
    assert_eq!(reports[3].selection.primary_ids(), fresh.selection.primary_ids());
    assert_eq!(reports[3].terminal_count, fresh.terminal_count);
    assert_eq!(reports[3].threads.len(), fresh.threads.len());
}

#[test]
fn test_custom_config_changes_caps() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("loom.toml");
    fs::write(&path, "[selection]\nmax_secondary_threads = 1\n").unwrap();

    let loom = Loom::from_config_file(&path).unwrap();
    let report = loom.evaluate(&fixtures::sample_threads(), 30);
    assert_eq!(report.selection.secondary_threads.len(), 1);
    assert!(report.selection.is_secondary("ferry"));
}
