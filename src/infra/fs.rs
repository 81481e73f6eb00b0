//! # File System Result Store / 文件系统结果存储
//!
//! The archive directory is the result store: one subdirectory per job,
//! each holding a `summary.yaml` stream once the job has finished, and
//! while it runs a `pid` marker and a free-text `job.log`.
//!
//! 归档目录即结果存储：每个作业一个子目录；作业完成后其中有 `summary.yaml` 流，
//! 运行期间则有 `pid` 标记文件和纯文本的 `job.log`。

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::models::{JobId, JobSummary};
use crate::core::store::{Liveness, ResultStore, StoreError};

pub const SUMMARY_FILE: &str = "summary.yaml";
pub const PID_FILE: &str = "pid";
pub const LOG_FILE: &str = "job.log";

/// A result store rooted at an archive directory.
#[derive(Debug, Clone)]
pub struct FsResultStore {
    root: PathBuf,
}

impl FsResultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn job_dir(&self, job: &JobId) -> PathBuf {
        self.root.join(job.as_str())
    }

    fn summary_path(&self, job: &JobId) -> PathBuf {
        self.job_dir(job).join(SUMMARY_FILE)
    }

    /// Whether the pid recorded for `job` is a live process started against
    /// this archive directory.
    fn live_pid(&self, job: &JobId) -> Option<u32> {
        let raw = fs::read_to_string(self.job_dir(job).join(PID_FILE)).ok()?;
        let pid: u32 = raw.trim().parse().ok()?;
        let proc_dir = PathBuf::from(format!("/proc/{pid}"));
        if !proc_dir.is_dir() {
            return None;
        }
        let cmdline = fs::read(proc_dir.join("cmdline")).ok()?;
        let cmdline = String::from_utf8_lossy(&cmdline).replace('\0', " ");
        cmdline
            .contains(&*self.root.to_string_lossy())
            .then_some(pid)
    }

    fn log_tail(&self, job: &JobId) -> Option<String> {
        let log = fs::read_to_string(self.job_dir(job).join(LOG_FILE)).ok()?;
        log.lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.trim_end().to_string())
    }
}

impl ResultStore for FsResultStore {
    fn list(&self) -> Result<Vec<JobId>, StoreError> {
        let io_err = |source| StoreError::Io {
            location: self.root.display().to_string(),
            source,
        };
        let mut jobs = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            jobs.push(JobId(name));
        }
        jobs.sort();
        Ok(jobs)
    }

    fn read(&self, job: &JobId) -> Result<Option<JobSummary>, StoreError> {
        let path = self.summary_path(job);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    location: path.display().to_string(),
                    source,
                });
            }
        };
        JobSummary::parse(&text)
            .map(Some)
            .map_err(|e| StoreError::Parse {
                job: job.clone(),
                message: e.to_string(),
            })
    }

    fn has_summary(&self, job: &JobId) -> bool {
        self.summary_path(job).exists()
    }

    fn probe(&self, job: &JobId) -> Liveness {
        let log_tail = self.log_tail(job);
        match self.live_pid(job) {
            Some(pid) => Liveness::Running { pid, log_tail },
            None => Liveness::Gone { log_tail },
        }
    }
}

/// Checks if a path exists and is a directory.
pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}
