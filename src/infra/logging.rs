//! # Logging Module / 日志模块
//!
//! Installs the process-wide `tracing` subscriber. Only the CLI calls this;
//! library code just emits events.
//!
//! 安装进程范围的 `tracing` 订阅者。只有 CLI 调用它；库代码只负责发出事件。

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Timestamp format of log files.
pub const LOG_FILE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Keeps the file writer alive; dropping it flushes pending lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initializes logging to stderr and, when `log_file` is given, to that file.
///
/// `-v` selects `debug`; otherwise `RUST_LOG` applies, defaulting to `info`.
///
/// 初始化输出到 stderr 的日志；若提供 `log_file`，同时写入该文件。
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<LogGuard> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("invalid log file path: {}", path.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(name.to_string_lossy().into_owned())
                .build(dir)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .with_timer(ChronoLocal::new(LOG_FILE_TIME_FORMAT.to_string()));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install the log subscriber")?;

    Ok(LogGuard { _file: guard })
}
