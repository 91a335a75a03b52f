use super::*;
use catalog_watcher::{AppError, CycleOutcome, PollState};

#[tokio::test]
async fn test_run_announces_only_additions_after_baseline() -> anyhow::Result<()> {
    let done = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(
        vec![
            Ok(listing(&[("Bloemkool", "/p/bloemkool"), ("Prei", "/p/prei")])),
            Ok(listing(&[("Bloemkool", "/p/bloemkool"), ("Prei", "/p/prei")])),
            Ok(listing(&[("Bloemkool", "/p/bloemkool"), ("Prei", "/p/prei"), ("Wortel", "/p/wortel")])),
            Ok(listing(&[("Wortel", "/p/wortel")])),
        ],
        done.clone(),
    );
    let notifier = RecordingNotifier::default();
    let reporter = RecordingReporter::default();

    let stats = poll_loop(fetcher, notifier.clone(), reporter.clone()).run(done).await;

    let batches = notifier.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], vec![Product::new("Wortel", "/p/wortel")]);

    assert_eq!(stats.cycles, 4);
    assert_eq!(stats.succeeded, 4);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.notifications_sent, 1);
    assert_eq!(
        reporter.states(),
        vec!["checking", "idle", "checking", "idle", "checking", "idle", "checking", "idle"]
    );
    assert!(*notifier.shut_down.lock().unwrap());

    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_keeps_previous_baseline() -> anyhow::Result<()> {
    let done = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(
        vec![
            Ok(listing(&[("Bloemkool", "/p/bloemkool")])),
            Err(AppError::Fetch("navigation timed out".to_string())),
            Ok(listing(&[("Bloemkool", "/p/bloemkool"), ("Ui", "/p/ui")])),
        ],
        done.clone(),
    );
    let notifier = RecordingNotifier::default();
    let reporter = RecordingReporter::default();

    let stats = poll_loop(fetcher, notifier.clone(), reporter.clone()).run(done).await;

    assert_eq!(stats.failed, 1);
    assert!(stats.last_error.as_deref().unwrap_or_default().contains("navigation timed out"));
    assert_eq!(notifier.batches(), vec![vec![Product::new("Ui", "/p/ui")]]);
    assert_eq!(
        reporter.states(),
        vec!["checking", "idle", "checking", "error", "checking", "idle"]
    );

    Ok(())
}

#[tokio::test]
async fn test_failed_notification_is_not_repeated() -> anyhow::Result<()> {
    let done = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(
        vec![
            Ok(listing(&[("Bloemkool", "/p/bloemkool")])),
            Ok(listing(&[("Bloemkool", "/p/bloemkool"), ("Ui", "/p/ui")])),
            Ok(listing(&[("Bloemkool", "/p/bloemkool"), ("Ui", "/p/ui")])),
        ],
        done.clone(),
    );
    let notifier = RecordingNotifier::failing();

    let stats = poll_loop(fetcher, notifier.clone(), RecordingReporter::default())
        .run(done)
        .await;

    assert_eq!(notifier.batches().len(), 1);
    assert_eq!(stats.notification_failures, 1);
    assert_eq!(stats.notifications_sent, 0);

    Ok(())
}

#[tokio::test]
async fn test_single_cycles_step_through_outcomes() -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(
        vec![
            Ok(listing(&[("Bloemkool", "/p/bloemkool")])),
            Ok(String::new()),
            Ok(listing(&[("Bloemkool", "/p/bloemkool"), ("Ui", "/p/ui")])),
            Ok(listing(&[("Ui", "/p/ui")])),
        ],
        CancellationToken::new(),
    );
    let mut poll = poll_loop(fetcher, RecordingNotifier::default(), RecordingReporter::default());

    let (state, outcome) = poll.run_cycle(PollState::new(), &cancel).await;
    assert_eq!(outcome, CycleOutcome::Baseline { total: 1 });

    let (state, outcome) = poll.run_cycle(state, &cancel).await;
    assert!(matches!(outcome, CycleOutcome::Failed { .. }));
    assert!(state.contains("/p/bloemkool"));

    let (state, outcome) = poll.run_cycle(state, &cancel).await;
    assert_eq!(outcome, CycleOutcome::Notified { total: 2, new: 1 });

    let (state, outcome) = poll.run_cycle(state, &cancel).await;
    assert_eq!(outcome, CycleOutcome::Unchanged { total: 1 });
    assert_eq!(state.len(), 1);
    assert_eq!(poll.stats().cycles, 4);

    Ok(())
}
