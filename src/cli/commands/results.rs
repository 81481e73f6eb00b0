//! # Results Command Module / 结果命令模块
//!
//! This module implements the `results` command: wait (bounded) for the
//! suite's jobs, classify one consistent snapshot of the archive, build the
//! report, then mail it and trigger coverage generation.
//!
//! 此模块实现 `results` 命令：（有界地）等待套件的作业完成，
//! 对归档的一个一致快照进行分类，构建报告，然后发送邮件并触发覆盖率生成。

use anyhow::{Context, Result, bail};
use colored::*;
use std::fmt;
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    core::{
        classifier,
        config::RunnerConfig,
        store::ResultStore,
        watcher::{self, WaitReport, WatchOptions},
    },
    infra::{
        command::{ProcessCoverageLauncher, SendmailNotifier},
        fs::{FsResultStore, is_directory},
        logging, t,
    },
    reporting::{
        notify::{CoverageLauncher, Notifier, PublishContext, PublishOutcome, publish},
        report::SuiteReport,
    },
};

/// Name of the log file written into the archive directory.
pub const RESULTS_LOG: &str = "results.log";

/// Arguments of the `results` command.
#[derive(Debug, Clone, Default)]
pub struct ResultsArgs {
    pub archive_dir: PathBuf,
    pub name: String,
    pub email: Option<String>,
    /// Seconds to wait for unfinished jobs; zero disables waiting.
    pub timeout: u64,
    pub verbose: bool,
}

/// Where a report run is. Terminal on `Reported`; nothing is retried.
/// 报告运行所处的阶段。到达 `Reported` 即终止；不进行任何重试。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPhase {
    /// Waiting on the result store.
    Collecting,
    /// Outcomes known, report built.
    Classified,
    /// Notification and coverage dispatched.
    Reported,
}

impl fmt::Display for ReportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportPhase::Collecting => "collecting",
            ReportPhase::Classified => "classified",
            ReportPhase::Reported => "reported",
        };
        f.write_str(name)
    }
}

/// The state of one report run.
#[derive(Debug)]
pub struct ResultsRun {
    pub phase: ReportPhase,
    pub wait: Option<WaitReport>,
    pub report: Option<SuiteReport>,
    pub published: Option<PublishOutcome>,
}

impl ResultsRun {
    fn new() -> Self {
        Self {
            phase: ReportPhase::Collecting,
            wait: None,
            report: None,
            published: None,
        }
    }

    fn advance(&mut self, phase: ReportPhase) {
        self.phase = phase;
        info!("{}", t!("results.phase", phase = phase));
    }
}

/// Drives one report run against any store, notifier and coverage launcher.
///
/// # Errors
/// A failure to list the store (while waiting or classifying) aborts the
/// run before any side effect; side-effect failures are only recorded.
pub async fn report_results<S, N, L>(
    store: &S,
    args: &ResultsArgs,
    config: &RunnerConfig,
    notifier: &N,
    launcher: &L,
    cancel: &CancellationToken,
) -> Result<ResultsRun>
where
    S: ResultStore,
    N: Notifier,
    L: CoverageLauncher,
{
    let mut run = ResultsRun::new();
    info!("{}", t!("results.phase", phase = run.phase));

    let options = WatchOptions::new(args.timeout, config.poll_interval());
    run.wait = Some(watcher::wait_for_jobs(store, &options, cancel).await?);

    // Classify against a single fresh listing taken after the wait.
    let outcomes = classifier::classify_store(store)?;
    let report = SuiteReport::build(&args.name, args.timeout, &outcomes);
    run.advance(ReportPhase::Classified);

    let ctx = PublishContext {
        config,
        archive_dir: &args.archive_dir,
        notify_address: args.email.as_deref(),
    };
    run.published = Some(publish(&report, &ctx, notifier, launcher).await);
    run.report = Some(report);
    run.advance(ReportPhase::Reported);
    Ok(run)
}

/// Sets up a signal handler that cancels the wait on Ctrl-C.
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                eprintln!("\n{}", t!("shutdown_signal").yellow());
                token_clone.cancel();
            }
            Err(e) => error!("failed to listen for Ctrl-C: {e}"),
        }
    });

    token
}

/// Executes the results command with the provided arguments.
pub async fn execute(args: ResultsArgs, config: &RunnerConfig) -> Result<ResultsRun> {
    if !is_directory(&args.archive_dir) {
        bail!(t!("archive_not_directory", path = args.archive_dir.display()).to_string());
    }
    let _log = logging::init(args.verbose, Some(&args.archive_dir.join(RESULTS_LOG)))?;

    let store = FsResultStore::new(&args.archive_dir);
    let notifier = SendmailNotifier::new(config.sendmail_command.clone());
    let launcher = ProcessCoverageLauncher::new(config.coverage_command.clone());
    let cancel = setup_signal_handler();

    let run = report_results(&store, &args, config, &notifier, &launcher, &cancel)
        .await
        .inspect_err(|e| error!("{}: {e:#}", t!("results.failed")))
        .with_context(|| t!("results.failed").to_string())?;

    if let Some(report) = &run.report {
        let subject = if report.all_passed() {
            report.subject().green().bold()
        } else {
            report.subject().red().bold()
        };
        println!("{subject}");
        println!("{}", report.body());
    }
    if let Some(published) = &run.published {
        if matches!(published.notification, Some(Err(_))) {
            eprintln!("{}", t!("results.mail_failed").yellow());
        }
        if published.coverage.is_err() {
            eprintln!("{}", t!("results.coverage_failed").yellow());
        }
    }
    Ok(run)
}
