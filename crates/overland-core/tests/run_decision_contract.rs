//! Run Contract: Notification Decisions
//!
//! Verifies the four decision branches end to end, through the engine:
//! - First run persists unconditionally and only notifies when something is available
//! - Identical state on a later run is silent and does not write
//! - Any change notifies and persists
//!
//! If this test fails, users get duplicate or missing alerts.

mod common;

use common::*;
use overland_core::WatchEngine;
use overland_core::diff::{NotificationDecision, Snapshot, SnapshotEntry};

fn engine(
    source: &ScriptedPageSource,
    notifier: &RecordingNotifier,
    store: &CountingSnapshotStore,
) -> WatchEngine {
    let (engine, _event_rx) = WatchEngine::new(
        Box::new(source.clone()),
        Box::new(notifier.clone()),
        Box::new(store.clone()),
        minimal_config(ymd(2026, 4, 15)),
    )
    .expect("engine construction succeeds");
    engine
}

#[tokio::test]
async fn first_run_with_availability_notifies_and_persists() {
    let source = ScriptedPageSource::single(DECEMBER_PAGE);
    let notifier = RecordingNotifier::new();
    let store = CountingSnapshotStore::new();

    let report = engine(&source, &notifier, &store)
        .run_at(ymd(2025, 12, 1))
        .await
        .unwrap();

    assert!(matches!(report.decision, NotificationDecision::FirstRun { .. }));
    assert_eq!(report.records_extracted, 4);
    let dates: Vec<_> = report.interesting.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![ymd(2025, 12, 6), ymd(2025, 12, 9)]);

    assert!(report.notified);
    assert_eq!(notifier.sent().len(), 1);
    assert!(notifier.sent()[0].contains("Saturday 06 Dec 2025: 1 spot"));
    assert!(notifier.sent()[0].contains("Tuesday 09 Dec 2025: 4 spots"));

    assert_eq!(store.save_count(), 1);
    assert_eq!(
        store.snapshot(),
        Some(Snapshot::new(vec![
            SnapshotEntry {
                date: ymd(2025, 12, 6),
                spots: Some(1)
            },
            SnapshotEntry {
                date: ymd(2025, 12, 9),
                spots: Some(4)
            },
        ]))
    );
}

#[tokio::test]
async fn first_run_with_nothing_is_silent_but_persists_empty() {
    let source = ScriptedPageSource::single(DECEMBER_PAGE);
    let notifier = RecordingNotifier::new();
    let store = CountingSnapshotStore::new();

    // Window starts after every date on the page
    let report = engine(&source, &notifier, &store)
        .run_at(ymd(2026, 1, 1))
        .await
        .unwrap();

    assert_eq!(report.decision, NotificationDecision::FirstRun { records: vec![] });
    assert!(!report.notified);
    assert_eq!(notifier.attempts(), 0);
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.snapshot(), Some(Snapshot::default()));
}

#[tokio::test]
async fn second_identical_run_is_unchanged() {
    let source = ScriptedPageSource::single(DECEMBER_PAGE);
    let notifier = RecordingNotifier::new();
    let store = CountingSnapshotStore::new();
    let engine = engine(&source, &notifier, &store);

    engine.run_at(ymd(2025, 12, 1)).await.unwrap();
    let second = engine.run_at(ymd(2025, 12, 1)).await.unwrap();

    assert_eq!(second.decision, NotificationDecision::Unchanged);
    assert!(!second.snapshot_written);
    assert_eq!(notifier.sent().len(), 1, "Only the first run should notify");
    assert_eq!(store.save_count(), 1, "Unchanged run must not write");
}

#[tokio::test]
async fn unchanged_snapshot_is_not_rewritten() {
    let page = "Monday 5 Jan 2026\nAvailable\n1 Available";
    let source = ScriptedPageSource::single(page);
    let notifier = RecordingNotifier::new();
    let store = CountingSnapshotStore::with_snapshot(Snapshot::new(vec![SnapshotEntry {
        date: ymd(2026, 1, 5),
        spots: Some(1),
    }]));

    let report = engine(&source, &notifier, &store)
        .run_at(ymd(2026, 1, 1))
        .await
        .unwrap();

    assert_eq!(report.decision, NotificationDecision::Unchanged);
    assert_eq!(store.save_count(), 0);
    assert_eq!(notifier.attempts(), 0);
}

#[tokio::test]
async fn availability_gone_notifies_and_persists_empty() {
    let page = "Monday 5 Jan 2026\nFully Booked";
    let source = ScriptedPageSource::single(page);
    let notifier = RecordingNotifier::new();
    let store = CountingSnapshotStore::with_snapshot(Snapshot::new(vec![SnapshotEntry {
        date: ymd(2026, 1, 5),
        spots: Some(1),
    }]));

    let report = engine(&source, &notifier, &store)
        .run_at(ymd(2026, 1, 1))
        .await
        .unwrap();

    assert_eq!(report.decision, NotificationDecision::ChangedToNone);
    assert!(report.notified);
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(store.snapshot(), Some(Snapshot::default()));
}

#[tokio::test]
async fn spot_count_change_notifies() {
    let page = "Monday 5 Jan 2026\nAvailable\n3 Available";
    let source = ScriptedPageSource::single(page);
    let notifier = RecordingNotifier::new();
    let store = CountingSnapshotStore::with_snapshot(Snapshot::new(vec![SnapshotEntry {
        date: ymd(2026, 1, 5),
        spots: Some(1),
    }]));

    let report = engine(&source, &notifier, &store)
        .run_at(ymd(2026, 1, 1))
        .await
        .unwrap();

    assert!(matches!(
        report.decision,
        NotificationDecision::ChangedToAvailable { .. }
    ));
    assert_eq!(store.save_count(), 1);
    assert!(notifier.sent()[0].contains("Monday 05 Jan 2026: 3 spots"));
}

#[tokio::test]
async fn corrupt_snapshot_forces_first_run() {
    let page = "Monday 5 Jan 2026\nAvailable\n1 Available";
    let source = ScriptedPageSource::single(page);
    let notifier = RecordingNotifier::new();
    let store = CountingSnapshotStore::corrupted();

    let report = engine(&source, &notifier, &store)
        .run_at(ymd(2026, 1, 1))
        .await
        .unwrap();

    assert!(matches!(report.decision, NotificationDecision::FirstRun { .. }));
    assert_eq!(store.load_count(), 1);
    assert_eq!(store.save_count(), 1);
}

#[tokio::test]
async fn dry_run_neither_sends_nor_persists() {
    let source = ScriptedPageSource::single(DECEMBER_PAGE);
    let notifier = RecordingNotifier::new();
    let store = CountingSnapshotStore::new();

    let mut config = minimal_config(ymd(2026, 4, 15));
    config.engine.dry_run = true;
    let (engine, _rx) = WatchEngine::new(
        Box::new(source.clone()),
        Box::new(notifier.clone()),
        Box::new(store.clone()),
        config,
    )
    .unwrap();

    let report = engine.run_at(ymd(2025, 12, 1)).await.unwrap();

    assert!(report.decision.should_notify());
    assert_eq!(notifier.attempts(), 0);
    assert_eq!(store.save_count(), 0);
}
