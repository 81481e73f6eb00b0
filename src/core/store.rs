//! # Result Store Module / 结果存储模块
//!
//! The shared result store is read-only from the runner's side: executors
//! append one subdirectory per job and eventually a summary document in it.
//! This trait hides the layout so watching and classification can run
//! against an in-memory fake.
//!
//! 共享结果存储对运行器而言是只读的：执行器为每个作业追加一个子目录，
//! 并最终在其中写入摘要文档。此 trait 隐藏了存储布局，
//! 使监视和分类逻辑可以针对内存中的替身运行。

use thiserror::Error;

use crate::core::models::{JobId, JobSummary};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read result store at {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed summary for job {job}: {message}")]
    Parse { job: JobId, message: String },
}

/// What a best-effort probe found out about a job without a summary.
/// 对没有摘要的作业进行尽力探测的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
    /// A recorded process is alive and belongs to this result store.
    Running { pid: u32, log_tail: Option<String> },
    /// No live process and no summary.
    Gone { log_tail: Option<String> },
}

pub trait ResultStore {
    /// Job ids in lexical order, hidden entries excluded.
    fn list(&self) -> Result<Vec<JobId>, StoreError>;

    /// The merged summary of a job, `None` while it has not been written.
    fn read(&self, job: &JobId) -> Result<Option<JobSummary>, StoreError>;

    /// Cheap existence check used by the poller.
    fn has_summary(&self, job: &JobId) -> bool {
        matches!(self.read(job), Ok(Some(_)))
    }

    /// Diagnostic only; never blocks and never fails.
    fn probe(&self, _job: &JobId) -> Liveness {
        Liveness::Gone { log_tail: None }
    }
}

impl<S: ResultStore + ?Sized> ResultStore for &S {
    fn list(&self) -> Result<Vec<JobId>, StoreError> {
        (**self).list()
    }

    fn read(&self, job: &JobId) -> Result<Option<JobSummary>, StoreError> {
        (**self).read(job)
    }

    fn has_summary(&self, job: &JobId) -> bool {
        (**self).has_summary(job)
    }

    fn probe(&self, job: &JobId) -> Liveness {
        (**self).probe(job)
    }
}
