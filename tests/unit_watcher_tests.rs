use std::time::Duration;
use tokio_util::sync::CancellationToken;

use suite_runner::core::classifier::classify_store;
use suite_runner::core::models::JobId;
use suite_runner::core::store::Liveness;
use suite_runner::core::watcher::{JobState, WaitOutcome, WatchOptions, list_jobs, wait_for_jobs};

mod common;
use common::MemoryStore;

const PASSED: &str = "success: true\nduration: 3\n";

fn options(timeout_secs: u64, interval_secs: u64) -> WatchOptions {
    WatchOptions::new(timeout_secs, Duration::from_secs(interval_secs))
}

#[tokio::test(start_paused = true)]
async fn test_zero_timeout_disables_waiting() {
    let store = MemoryStore::new().silent("1");

    let report = wait_for_jobs(&store, &options(0, 10), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.outcome, WaitOutcome::Disabled);
    assert_eq!(report.pending, [JobId::from("1")]);
    assert_eq!(report.elapsed, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_pending_completes_immediately() {
    let store = MemoryStore::new().finished("1", PASSED);

    let report = wait_for_jobs(&store, &options(30, 10), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.outcome, WaitOutcome::Completed);
    assert!(report.pending.is_empty());
}

/// A summary written just before the deadline counts as finished.
/// 在截止时间之前写入的摘要视为已完成。
#[tokio::test(start_paused = true)]
async fn test_summary_before_timeout_is_passed() {
    let store = MemoryStore::new()
        .finished("1", PASSED)
        .appearing("2", Duration::from_secs(29), PASSED);

    let report = wait_for_jobs(&store, &options(30, 10), &CancellationToken::new())
        .await
        .unwrap();
    let outcomes = classify_store(&store).unwrap();

    assert_eq!(report.outcome, WaitOutcome::Completed);
    assert!(outcomes.iter().all(|o| o.is_passed()));
}

/// A summary written after the deadline is not seen: the job is hung.
/// 截止时间之后写入的摘要不会被看到：该作业被视为挂起。
#[tokio::test(start_paused = true)]
async fn test_summary_after_timeout_is_hung() {
    let store = MemoryStore::new()
        .finished("1", PASSED)
        .appearing("2", Duration::from_secs(31), PASSED);

    let report = wait_for_jobs(&store, &options(30, 10), &CancellationToken::new())
        .await
        .unwrap();
    let outcomes = classify_store(&store).unwrap();

    assert_eq!(report.outcome, WaitOutcome::TimedOut);
    assert_eq!(report.pending, [JobId::from("2")]);
    assert!(outcomes[0].is_passed());
    assert!(outcomes[1].is_hung());
}

/// The wait ends no later than the timeout and never polls faster than the
/// interval, even when the timeout is not a multiple of it.
///
/// 等待最迟在超时时刻结束，且轮询频率从不高于设定的间隔，即使超时不是间隔的整数倍。
#[tokio::test(start_paused = true)]
async fn test_wait_is_bounded_and_rate_limited() {
    let store = MemoryStore::new().silent("1");

    let report = wait_for_jobs(&store, &options(25, 10), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.outcome, WaitOutcome::TimedOut);
    assert!(report.elapsed <= Duration::from_secs(25));
    // One check while collecting candidates, then polls at 0s, 10s and 20s.
    assert_eq!(store.polls.get(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_jobs_finishing_out_of_order() {
    let store = MemoryStore::new()
        .appearing("1", Duration::from_secs(5), PASSED)
        .appearing("2", Duration::from_secs(15), PASSED);

    let report = wait_for_jobs(&store, &options(60, 10), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.outcome, WaitOutcome::Completed);
    assert_eq!(report.elapsed, Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_wait_stops_early() {
    let store = MemoryStore::new().silent("1");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = wait_for_jobs(&store, &options(3600, 10), &cancel)
        .await
        .unwrap();

    assert_eq!(report.outcome, WaitOutcome::Cancelled);
    assert_eq!(report.pending, [JobId::from("1")]);
    assert!(report.elapsed < Duration::from_secs(10));
}

/// Listing mode reports every job without waiting.
/// 列表模式在不等待的情况下报告每个作业。
#[tokio::test(start_paused = true)]
async fn test_list_jobs_states() {
    let store = MemoryStore::new()
        .finished("1", "success: false\nowner: bob\n")
        .silent("2")
        .finished("3", "success: [broken\n");

    let listings = list_jobs(&store).unwrap();

    assert_eq!(listings.len(), 3);
    match &listings[0].state {
        JobState::Finished(summary) => assert_eq!(summary.owner.as_deref(), Some("bob")),
        other => panic!("expected a summary, got {other:?}"),
    }
    assert_eq!(
        listings[1].state,
        JobState::Pending(Liveness::Gone {
            log_tail: Some("INFO:still going".to_string())
        })
    );
    assert!(matches!(listings[2].state, JobState::Unreadable(_)));
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_summary_is_classified_hung() {
    let store = MemoryStore::new().finished("1", "success: [broken\n");

    let outcomes = classify_store(&store).unwrap();

    assert!(outcomes[0].is_hung());
}
