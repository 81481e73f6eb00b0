//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Suite Runner:
//! external process invocation, the filesystem result store and logging.
//!
//! 此模块为 Suite Runner 提供基础设施服务：
//! 外部进程调用、文件系统结果存储和日志。

pub mod command;
pub mod fs;
pub mod logging;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
