//! # Console Reporting Module / 控制台报告模块
//!
//! Prints the job listing of a result store, one line per job, with the
//! pass/FAIL word colored when the output is a terminal.
//!
//! 打印结果存储的作业列表，每个作业一行；当输出为终端时，pass/FAIL 字样带颜色。

use colored::*;

use crate::core::store::Liveness;
use crate::core::watcher::{JobListing, JobState};

/// Renders the listing line(s) of one job.
///
/// # Output Format / 输出格式
/// ```text
/// 1234 pass alice collection:smoke clusters:fixed.yaml workload:rbd.yaml 512s
/// 1235 FAIL alice collection:smoke clusters:three-way.yaml workload:rbd.yaml 87s
///     osd crashed
/// 1236       (pid 4242) INFO:running workunit
/// 1237       (no process or summary.yaml)
/// ```
pub fn format_listing(listing: &JobListing, verbose: bool) -> Vec<String> {
    let job = &listing.job;
    match &listing.state {
        JobState::Finished(summary) => {
            let status = if summary.success {
                "pass".green()
            } else {
                "FAIL".red()
            };
            let mut lines = vec![format!(
                "{job} {status} {owner} {desc} {duration}s",
                owner = summary.owner.as_deref().unwrap_or("-"),
                desc = summary.description_or_dash(),
                duration = summary.duration_secs(),
            )];
            if verbose {
                if let Some(reason) = &summary.failure_reason {
                    lines.push(format!("    {reason}"));
                }
            }
            lines
        }
        JobState::Pending(liveness) => {
            let (probe, tail) = match liveness {
                Liveness::Running { pid, log_tail } => (format!("(pid {pid})"), log_tail),
                Liveness::Gone { log_tail } => {
                    ("(no process or summary.yaml)".to_string(), log_tail)
                }
            };
            let line = match tail {
                Some(tail) => format!("{job}       {probe} {tail}"),
                None => format!("{job}       {probe}"),
            };
            vec![line]
        }
        JobState::Unreadable(message) => {
            vec![format!("{job}       {}", format!("({message})").yellow())]
        }
    }
}

/// Prints the listing of every job to standard output.
/// 将每个作业的列表打印到标准输出。
pub fn print_listing(listings: &[JobListing], verbose: bool) {
    for listing in listings {
        for line in format_listing(listing, verbose) {
            println!("{line}");
        }
    }
}
