//! # Job Dispatch Module / 作业分发模块
//!
//! Submits every planned job to the external queue, one submission per
//! repetition, then exactly one "last in suite" marker. Submission is
//! strictly sequential: the marker must never be queued ahead of a regular
//! job, and the first failed submission aborts everything that follows,
//! the marker included.
//!
//! 将每个计划的作业提交到外部队列（每次重复提交一次），然后提交且仅提交一个
//! "套件最后一个" 标记作业。提交严格按顺序进行：标记作业绝不能排在普通作业之前，
//! 第一次提交失败会中止其后的所有提交，包括标记作业。

use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::config::SuiteRun;
use crate::core::models::JobId;
use crate::core::planner::SuitePlan;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("queue rejected the job ({status}): {stderr}")]
    Rejected { status: String, stderr: String },

    #[error("queue command is empty")]
    EmptyCommand,
}

/// A submission failure, with how far dispatch got before it.
#[derive(Debug, Error)]
#[error("submission #{} failed after {submitted} job(s) were queued: {source}", .submitted + 1)]
pub struct DispatchError {
    pub submitted: usize,
    #[source]
    pub source: SubmitError,
}

/// What a single submission asks the queue to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    Regular {
        description: String,
        /// Suite-wide overrides first, then the job's own configs, so the
        /// job's configs win on key conflicts when the executor merges them.
        config_paths: Vec<PathBuf>,
    },
    LastInSuite {
        timeout_seconds: Option<u64>,
        notify_address: Option<String>,
    },
}

/// One call to the submission interface.
/// 对提交接口的一次调用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub suite_name: String,
    pub num: u32,
    pub verbose: bool,
    pub owner: Option<String>,
    pub kind: JobKind,
}

impl JobDescriptor {
    fn base(suite: &SuiteRun, kind: JobKind) -> Self {
        Self {
            suite_name: suite.name.clone(),
            num: 1,
            verbose: suite.verbose,
            owner: suite.owner.clone(),
            kind,
        }
    }

    pub fn is_last_in_suite(&self) -> bool {
        matches!(self.kind, JobKind::LastInSuite { .. })
    }

    /// Renders the positional command line of the external queue program.
    /// Options come first; config paths follow a literal `--`.
    ///
    /// 生成外部队列程序的命令行参数。选项在前；配置路径位于字面量 `--` 之后。
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--name".to_string(),
            self.suite_name.clone(),
            "--num".to_string(),
            self.num.to_string(),
        ];
        if self.verbose {
            args.push("-v".to_string());
        }
        if let Some(owner) = &self.owner {
            args.extend(["--owner".to_string(), owner.clone()]);
        }

        match &self.kind {
            JobKind::Regular {
                description,
                config_paths,
            } => {
                args.extend([
                    "--description".to_string(),
                    description.clone(),
                    "--".to_string(),
                ]);
                args.extend(config_paths.iter().map(|p| p.display().to_string()));
            }
            JobKind::LastInSuite {
                timeout_seconds,
                notify_address,
            } => {
                args.push("--last-in-suite".to_string());
                if let Some(email) = notify_address {
                    args.extend(["--email".to_string(), email.clone()]);
                }
                if let Some(timeout) = timeout_seconds {
                    args.extend(["--timeout".to_string(), timeout.to_string()]);
                }
            }
        }
        args
    }
}

/// The external queue, as far as the runner is concerned.
/// 就运行器而言的外部队列。
#[allow(async_fn_in_trait)]
pub trait JobQueueClient {
    async fn submit(&mut self, job: &JobDescriptor) -> Result<JobId, SubmitError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Regular submissions in the order they were queued.
    pub submitted: Vec<(JobId, String)>,
    pub marker: Option<JobId>,
}

/// Builds every descriptor the suite will submit, marker last.
pub fn build_descriptors(suite: &SuiteRun, plan: &SuitePlan) -> Vec<JobDescriptor> {
    let mut descriptors = Vec::with_capacity(plan.submission_count() + 1);
    for job in &plan.jobs {
        let config_paths: Vec<PathBuf> = suite
            .override_config_paths
            .iter()
            .chain(job.config_paths())
            .cloned()
            .collect();
        for _ in 0..job.sequence_count {
            descriptors.push(JobDescriptor::base(
                suite,
                JobKind::Regular {
                    description: job.description.clone(),
                    config_paths: config_paths.clone(),
                },
            ));
        }
    }
    descriptors.push(JobDescriptor::base(
        suite,
        JobKind::LastInSuite {
            timeout_seconds: suite.timeout_seconds,
            notify_address: suite.notify_address.clone(),
        },
    ));
    descriptors
}

/// Submits the whole suite through `client`.
///
/// # Errors
/// Returns the first submission failure; nothing after it, the terminal
/// marker included, is submitted.
pub async fn dispatch_suite<C: JobQueueClient>(
    client: &mut C,
    suite: &SuiteRun,
    plan: &SuitePlan,
) -> Result<DispatchReport, DispatchError> {
    let mut report = DispatchReport::default();

    for descriptor in build_descriptors(suite, plan) {
        if let JobKind::Regular { description, .. } = &descriptor.kind {
            info!("Scheduling {description}");
        } else {
            info!("Scheduling end-of-suite marker for {}", suite.name);
        }

        let job = client
            .submit(&descriptor)
            .await
            .map_err(|source| DispatchError {
                submitted: report.submitted.len(),
                source,
            })?;
        debug!(job = %job, "queued");

        match descriptor.kind {
            JobKind::Regular { description, .. } => report.submitted.push((job, description)),
            JobKind::LastInSuite { .. } => report.marker = Some(job),
        }
    }

    Ok(report)
}
