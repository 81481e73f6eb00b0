//! # Outcome Classifier Module / 结果分类模块
//!
//! Turns one consistent snapshot of the result store into per-job outcomes.
//! A missing or unreadable summary is never an error here: such jobs are hung.
//!
//! 将结果存储的一个一致快照转换为每个作业的结果。
//! 缺失或无法读取的摘要在这里从不视为错误：这类作业被视为挂起。

use tracing::warn;

use crate::core::models::{JobId, JobOutcome, JobSummary};
use crate::core::store::{ResultStore, StoreError};

/// Classifies one job from its (possibly absent) merged summary.
pub fn classify_summary(job: JobId, summary: Option<&JobSummary>) -> JobOutcome {
    match summary {
        None => JobOutcome::Hung { job },
        Some(summary) if summary.success => JobOutcome::Passed {
            job,
            duration_secs: summary.duration_secs(),
            description: summary.description_or_dash().to_string(),
        },
        Some(summary) => JobOutcome::Failed {
            job,
            duration_secs: summary.duration_secs(),
            description: summary.description_or_dash().to_string(),
            reason: summary.failure_reason.clone(),
        },
    }
}

/// Lists the store once and classifies every job in lexical job order.
///
/// # Errors
/// Only a failure to list the store itself is returned.
///
/// 列出存储一次，并按作业的字典序对每个作业进行分类。
/// 仅当存储本身无法列出时才返回错误。
pub fn classify_store<S: ResultStore>(store: &S) -> Result<Vec<JobOutcome>, StoreError> {
    let outcomes = store
        .list()?
        .into_iter()
        .map(|job| {
            let summary = match store.read(&job) {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("treating job {job} as unfinished: {e}");
                    None
                }
            };
            classify_summary(job, summary.as_ref())
        })
        .collect();
    Ok(outcomes)
}
