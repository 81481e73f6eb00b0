//! # Schedule Command Module / 调度命令模块
//!
//! This module implements the `schedule` command: validate every collection,
//! expand the matrix, queue each job and finally the end-of-suite marker.
//!
//! 此模块实现 `schedule` 命令：校验所有 collection，展开矩阵，
//! 逐个提交作业，最后提交套件结束标记。

use anyhow::{Result, bail};
use colored::*;
use std::path::PathBuf;
use tracing::{error, info};

use crate::{
    core::{
        collection::{self, TreeError, TreeOptions},
        config::{RunnerConfig, SuiteRun},
        dispatch::{DispatchReport, JobQueueClient, dispatch_suite},
        planner::{self, SuitePlan},
    },
    infra::{
        command::{DryRunQueueClient, ProcessQueueClient},
        logging, t,
    },
};

/// Arguments of the `schedule` command.
#[derive(Debug, Clone, Default)]
pub struct ScheduleArgs {
    pub name: String,
    pub collections: Vec<PathBuf>,
    pub owner: Option<String>,
    pub email: Option<String>,
    pub timeout: Option<u64>,
    pub num: u32,
    pub verbose: bool,
    pub dry_run: bool,
    /// Override config files applied to every job.
    pub configs: Vec<PathBuf>,
}

impl ScheduleArgs {
    fn suite_run(&self) -> SuiteRun {
        SuiteRun {
            name: self.name.clone(),
            owner: self.owner.clone(),
            override_config_paths: self.configs.clone(),
            timeout_seconds: self.timeout,
            notify_address: self.email.clone(),
            sequence_count: self.num.max(1),
            verbose: self.verbose,
        }
    }
}

/// Validates and reads every collection, then expands the suite matrix.
///
/// Validation covers all collections before any of them is read, so a bad
/// path never leaves a partially planned suite behind.
///
/// 校验并读取所有 collection，然后展开套件矩阵。
/// 在读取任何 collection 之前先校验全部路径，因此错误路径绝不会留下部分计划的套件。
pub fn plan(
    collections: &[PathBuf],
    sequence_count: u32,
    config: &RunnerConfig,
) -> Result<SuitePlan, TreeError> {
    collection::validate_collections(collections)?;

    let options = TreeOptions {
        extensions: config.config_extensions.clone(),
    };
    let trees = collections
        .iter()
        .map(|path| collection::read_collection(path, &options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(planner::plan_suite(trees, sequence_count))
}

/// Plans and submits a suite through `client`.
pub async fn schedule_with<C: JobQueueClient>(
    client: &mut C,
    args: &ScheduleArgs,
    config: &RunnerConfig,
) -> Result<DispatchReport> {
    let suite = args.suite_run();
    let plan = match plan(&args.collections, suite.sequence_count, config) {
        Ok(plan) => plan,
        Err(TreeError::NotADirectory(path)) => {
            bail!(t!("collection_not_directory", path = path.display()).to_string())
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{}",
        t!(
            "schedule.planned",
            jobs = plan.jobs.len(),
            submissions = plan.submission_count(),
            collections = args.collections.len()
        )
        .cyan()
    );
    if !plan.anomalies.is_empty() {
        println!(
            "{}",
            t!("schedule.anomalies", count = plan.anomalies.len()).yellow()
        );
    }

    match dispatch_suite(client, &suite, &plan).await {
        Ok(report) => {
            info!(
                "queued {} job(s), end-of-suite marker {}",
                report.submitted.len(),
                report.marker.as_ref().map(|m| m.to_string()).unwrap_or_default()
            );
            Ok(report)
        }
        Err(e) => {
            error!("{e}");
            eprintln!("{}", t!("schedule.aborted").red());
            Err(e.into())
        }
    }
}

/// Executes the schedule command with the provided arguments.
///
/// # Returns
/// An error if a collection is not a directory or any submission fails.
pub async fn execute(args: ScheduleArgs, config: &RunnerConfig) -> Result<()> {
    let _log = logging::init(args.verbose, None)?;

    if args.dry_run {
        let mut client = DryRunQueueClient::new(&config.schedule_command);
        schedule_with(&mut client, &args, config).await?;
        println!("{}", t!("schedule.dry_run").green());
        return Ok(());
    }

    let mut client = ProcessQueueClient::new(&config.schedule_command)?;
    let report = schedule_with(&mut client, &args, config).await?;
    println!(
        "{}",
        t!(
            "schedule.done",
            count = report.submitted.len(),
            name = args.name
        )
        .green()
        .bold()
    );
    Ok(())
}
