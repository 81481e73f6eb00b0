//! # Result Store Watcher Module / 结果存储监视模块
//!
//! Two modes over a [`ResultStore`]:
//!
//! - listing: a non-blocking snapshot of every job with its summary or,
//!   when there is none yet, a best-effort liveness probe;
//! - waiting: a bounded poll until every job that lacked a summary at the
//!   start has one, the timeout expires, or the wait is cancelled.
//!
//! The waiting poll only ever inspects the most recently added pending job.
//! Earlier jobs that finish out of order are noticed once the later ones are
//! retired or when the final snapshot is taken after the wait.
//!
//! 基于 [`ResultStore`] 的两种模式：
//!
//! - 列表模式：对每个作业进行非阻塞快照，包含其摘要；若尚无摘要，则进行尽力的存活探测；
//! - 等待模式：有界轮询，直到开始时缺少摘要的所有作业都有了摘要、超时或等待被取消。
//!
//! 等待轮询只检查最近加入的待处理作业。乱序完成的较早作业会在后面的作业被移除后，
//! 或在等待结束后的最终快照中被发现。

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::models::{JobId, JobSummary};
use crate::core::store::{Liveness, ResultStore, StoreError};

/// What listing mode knows about one job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Finished(JobSummary),
    Pending(Liveness),
    /// A summary exists but could not be parsed.
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobListing {
    pub job: JobId,
    pub state: JobState,
}

/// Lists every job in the store. Never waits.
/// 列出存储中的每个作业，从不等待。
pub fn list_jobs<S: ResultStore>(store: &S) -> Result<Vec<JobListing>, StoreError> {
    let listings = store
        .list()?
        .into_iter()
        .map(|job| {
            let state = match store.read(&job) {
                Ok(Some(summary)) => JobState::Finished(summary),
                Ok(None) => JobState::Pending(store.probe(&job)),
                Err(e) => JobState::Unreadable(e.to_string()),
            };
            JobListing { job, state }
        })
        .collect();
    Ok(listings)
}

/// Timing of the waiting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Zero disables waiting.
    pub timeout: Duration,
    /// Minimum time between two polls.
    pub poll_interval: Duration,
}

impl WatchOptions {
    pub fn new(timeout_secs: u64, poll_interval: Duration) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            poll_interval,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every pending job got a summary.
    Completed,
    TimedOut,
    Cancelled,
    /// The timeout was zero; nothing was awaited.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitReport {
    pub outcome: WaitOutcome,
    /// Candidates not retired when the wait ended.
    pub pending: Vec<JobId>,
    pub elapsed: Duration,
}

/// Waits, bounded by `options.timeout`, for the jobs that have no summary yet.
///
/// Terminates no later than the timeout after entry and never polls the
/// store more often than `options.poll_interval`.
///
/// 在 `options.timeout` 的限制内等待尚无摘要的作业。
/// 最迟在进入后超时时刻终止，且轮询频率从不高于 `options.poll_interval`。
pub async fn wait_for_jobs<S: ResultStore>(
    store: &S,
    options: &WatchOptions,
    cancel: &CancellationToken,
) -> Result<WaitReport, StoreError> {
    let mut candidates: Vec<JobId> = store
        .list()?
        .into_iter()
        .filter(|job| !store.has_summary(job))
        .collect();

    let start = Instant::now();
    if options.timeout.is_zero() {
        return Ok(WaitReport {
            outcome: WaitOutcome::Disabled,
            pending: candidates,
            elapsed: Duration::ZERO,
        });
    }

    info!(
        "Waiting up to {} seconds for {} job(s) to finish...",
        options.timeout.as_secs(),
        candidates.len()
    );

    let outcome = loop {
        let Some(last) = candidates.last() else {
            break WaitOutcome::Completed;
        };
        if store.has_summary(last) {
            debug!(job = %last, "job finished");
            candidates.pop();
            continue;
        }

        let elapsed = start.elapsed();
        if elapsed >= options.timeout {
            break WaitOutcome::TimedOut;
        }

        let nap = options.poll_interval.min(options.timeout - elapsed);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break WaitOutcome::Cancelled,
            _ = tokio::time::sleep(nap) => {}
        }
        if nap < options.poll_interval {
            break WaitOutcome::TimedOut;
        }
    };

    match outcome {
        WaitOutcome::TimedOut => warn!(
            "{} job(s) did not finish before timeout of {} seconds",
            candidates.len(),
            options.timeout.as_secs()
        ),
        WaitOutcome::Cancelled => warn!("wait cancelled with {} job(s) pending", candidates.len()),
        _ => info!("Jobs finished! gathering results..."),
    }

    Ok(WaitReport {
        outcome,
        pending: candidates,
        elapsed: start.elapsed(),
    })
}
