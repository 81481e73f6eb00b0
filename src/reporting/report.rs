//! # Suite Report Module / 套件报告模块
//!
//! Aggregates classified outcomes into the suite-level subject and body.
//! The text is a fixed format consumed by people and mail filters, so it is
//! never localized.
//!
//! 将分类后的结果聚合为套件级别的主题和正文。
//! 该文本是供人和邮件过滤器使用的固定格式，因此从不进行本地化。

use crate::core::models::{JobId, JobOutcome};

/// The suite-level report.
/// 套件级别的报告。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteReport {
    pub suite_name: String,
    /// The wait timeout, quoted in the hung section.
    pub timeout_secs: u64,
    /// `<job>: (<duration>s) <description>` of every job with a summary.
    pub descriptions: Vec<String>,
    pub passed: Vec<String>,
    /// Failure entries, each followed by an indented reason line when known.
    pub failures: Vec<String>,
    pub num_failed: usize,
    pub hung: Vec<JobId>,
}

fn entry(job: &JobId, duration_secs: u64, description: &str) -> String {
    format!("{job}: ({duration_secs}s) {description}")
}

impl SuiteReport {
    pub fn build(suite_name: &str, timeout_secs: u64, outcomes: &[JobOutcome]) -> Self {
        let mut report = SuiteReport {
            suite_name: suite_name.to_string(),
            timeout_secs,
            ..Self::default()
        };

        for outcome in outcomes {
            match outcome {
                JobOutcome::Passed {
                    job,
                    duration_secs,
                    description,
                } => {
                    let line = entry(job, *duration_secs, description);
                    report.descriptions.push(line.clone());
                    report.passed.push(line);
                }
                JobOutcome::Failed {
                    job,
                    duration_secs,
                    description,
                    reason,
                } => {
                    let line = entry(job, *duration_secs, description);
                    report.descriptions.push(line.clone());
                    report.failures.push(line);
                    report.num_failed += 1;
                    if let Some(reason) = reason {
                        report.failures.push(format!("    {reason}"));
                    }
                }
                JobOutcome::Hung { job } => report.hung.push(job.clone()),
            }
        }
        report
    }

    pub fn all_passed(&self) -> bool {
        self.num_failed == 0 && self.hung.is_empty()
    }

    pub fn subject(&self) -> String {
        if self.all_passed() {
            format!("All tests passed in {}!", self.suite_name)
        } else {
            format!(
                "{} failed, {} possibly hung, and {} passed tests in {}",
                self.num_failed,
                self.hung.len(),
                self.passed.len(),
                self.suite_name
            )
        }
    }

    pub fn body(&self) -> String {
        if self.all_passed() {
            return self.descriptions.join("\n");
        }

        let hung = self
            .hung
            .iter()
            .map(JobId::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "\nThe following tests failed:\n\n{failures}\n\n\
             These tests may be hung (did not finish in {timeout} seconds after the last test in the suite):\n\
             {hung}\n\n\
             These tests passed:\n{passed}",
            failures = self.failures.join("\n"),
            timeout = self.timeout_secs,
            passed = self.passed.join("\n"),
        )
    }
}
