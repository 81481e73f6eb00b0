//! # Core Module / 核心模块
//!
//! This module contains the Matrix Scheduler & Run Aggregator:
//! reading collection trees, expanding them into jobs, dispatching jobs
//! to the external queue, watching the result store and classifying outcomes.
//!
//! 此模块包含矩阵调度器与运行聚合器：
//! 读取 collection 目录树、将其展开为作业、将作业分发到外部队列、
//! 监视结果存储并对结果进行分类。

pub mod classifier;
pub mod collection;
pub mod config;
pub mod dispatch;
pub mod models;
pub mod planner;
pub mod store;
pub mod watcher;

// Re-exports
pub use config::{RunnerConfig, SuiteRun};
pub use dispatch::{JobQueueClient, dispatch_suite};
pub use models::{JobId, JobOutcome, JobSummary};
pub use store::ResultStore;
