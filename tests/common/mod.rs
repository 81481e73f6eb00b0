// Shared test helpers for integration tests
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use tokio::time::Instant;

use suite_runner::core::dispatch::{JobDescriptor, JobQueueClient, SubmitError};
use suite_runner::core::models::{JobId, JobSummary};
use suite_runner::core::store::{Liveness, ResultStore, StoreError};
use suite_runner::reporting::notify::{
    CoverageError, CoverageLauncher, CoverageRequest, Notification, Notifier, NotifyError,
};

/// Creates every file (and its parent directories) under `root`.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
    }
}

/// The `smoke` collection: `clusters` has two configs, `workload` one.
pub fn smoke_collection(root: &Path) -> PathBuf {
    write_files(
        root,
        &[
            ("smoke/clusters/fixed.yaml", "roles: [[mon.a, osd.0]]\n"),
            ("smoke/clusters/three-way.yaml", "roles: [[mon.a], [osd.0], [osd.1]]\n"),
            ("smoke/workload/rbd.yaml", "tasks: [rbd]\n"),
        ],
    );
    root.join("smoke")
}

/// An archive directory with one subdirectory per job and optional summaries.
pub fn archive_with(jobs: &[(&str, Option<&str>)]) -> TempDir {
    let archive = tempdir().expect("Failed to create temporary directory");
    for (job, summary) in jobs {
        let job_dir = archive.path().join(job);
        fs::create_dir_all(&job_dir).unwrap();
        if let Some(summary) = summary {
            fs::write(job_dir.join("summary.yaml"), summary).unwrap();
        }
    }
    archive
}

/// A runner config file that needs nothing from the environment.
pub fn write_runner_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("runner.toml");
    let content = format!("language = \"en\"\n{extra}");
    fs::write(&path, content).unwrap();
    path
}

/// In-memory result store whose summaries appear at given (tokio) times.
pub struct MemoryStore {
    start: Instant,
    jobs: BTreeMap<JobId, Option<(Duration, String)>>,
    pub polls: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            jobs: BTreeMap::new(),
            polls: Cell::new(0),
        }
    }

    /// A job whose summary exists from the start.
    pub fn finished(self, job: &str, summary: &str) -> Self {
        self.appearing(job, Duration::ZERO, summary)
    }

    /// A job whose summary shows up `after` the store was created.
    pub fn appearing(mut self, job: &str, after: Duration, summary: &str) -> Self {
        self.jobs
            .insert(JobId::from(job), Some((after, summary.to_string())));
        self
    }

    /// A job that never writes a summary.
    pub fn silent(mut self, job: &str) -> Self {
        self.jobs.insert(JobId::from(job), None);
        self
    }

    fn visible(&self, job: &JobId) -> Option<&str> {
        match self.jobs.get(job)? {
            Some((after, text)) if self.start.elapsed() >= *after => Some(text),
            _ => None,
        }
    }
}

impl ResultStore for MemoryStore {
    fn list(&self) -> Result<Vec<JobId>, StoreError> {
        Ok(self.jobs.keys().cloned().collect())
    }

    fn read(&self, job: &JobId) -> Result<Option<JobSummary>, StoreError> {
        match self.visible(job) {
            Some(text) => JobSummary::parse(text)
                .map(Some)
                .map_err(|e| StoreError::Parse {
                    job: job.clone(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn has_summary(&self, job: &JobId) -> bool {
        self.polls.set(self.polls.get() + 1);
        self.visible(job).is_some()
    }

    fn probe(&self, _job: &JobId) -> Liveness {
        Liveness::Gone {
            log_tail: Some("INFO:still going".to_string()),
        }
    }
}

/// A queue that records every submission and can be told to fail.
#[derive(Default)]
pub struct RecordingQueue {
    pub submitted: Vec<JobDescriptor>,
    /// Zero-based index of the submission that fails.
    pub fail_at: Option<usize>,
}

impl JobQueueClient for RecordingQueue {
    async fn submit(&mut self, job: &JobDescriptor) -> Result<JobId, SubmitError> {
        if self.fail_at == Some(self.submitted.len()) {
            return Err(SubmitError::Rejected {
                status: "exit status: 1".to_string(),
                stderr: "queue is down".to_string(),
            });
        }
        self.submitted.push(job.clone());
        Ok(JobId(format!("job-{}", self.submitted.len())))
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub fail: bool,
    pub sent: RefCell<Vec<Notification>>,
}

impl Notifier for FakeNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.borrow_mut().push(notification.clone());
        if self.fail {
            return Err(NotifyError::Failed {
                status: "exit status: 75".to_string(),
                stderr: "mail server unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeLauncher {
    pub launched: RefCell<Vec<CoverageRequest>>,
}

impl CoverageLauncher for FakeLauncher {
    fn launch(&self, request: &CoverageRequest) -> Result<(), CoverageError> {
        self.launched.borrow_mut().push(request.clone());
        Ok(())
    }
}
