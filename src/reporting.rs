//! # Reporting Module / 报告模块
//!
//! This module turns classified outcomes into the suite report, prints job
//! listings to the console, and dispatches the report's side effects
//! (mail notification and coverage generation).
//!
//! 此模块将分类结果转换为套件报告，在控制台打印作业列表，
//! 并执行报告的副作用（邮件通知和覆盖率生成）。

pub mod console;
pub mod notify;
pub mod report;

// Re-export common reporting functions
pub use console::print_listing;
pub use notify::{CoverageLauncher, Notifier, publish};
pub use report::SuiteReport;
