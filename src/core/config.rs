//! # Configuration Module / 配置模块
//!
//! Runner-wide settings are loaded once from a TOML file and then passed
//! explicitly to every component that needs them. There is no global state.
//!
//! 运行器范围的设置从 TOML 文件加载一次，然后显式传递给需要它们的各个组件。
//! 不存在全局状态。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// The file looked up in the home directory when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "~/.suite-runner.toml";

/// Errors raised while locating or parsing the runner configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to expand path '{0}'")]
    Expand(String),
}

/// Represents the runner configuration, loaded from a TOML file.
/// Every field has a default so an empty file is a valid configuration.
///
/// 代表从 TOML 文件加载的运行器配置。
/// 每个字段都有默认值，因此空文件也是有效配置。
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// Falls back to the detected system locale when absent.
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。未设置时使用系统语言。
    pub language: Option<String>,

    /// Program (with optional arguments) used to enqueue one job.
    /// 用于将单个作业加入队列的程序（可带参数）。
    pub schedule_command: String,

    /// Program (with optional arguments) used to generate coverage reports.
    /// 用于生成覆盖率报告的程序（可带参数）。
    pub coverage_command: String,

    /// Mail transport; the message is written to its standard input.
    /// 邮件传输程序；邮件内容写入其标准输入。
    pub sendmail_command: String,

    /// `From:` address of result mails.
    pub results_sending_email: String,

    pub coverage_output_dir: Option<PathBuf>,
    pub coverage_html_dir: Option<PathBuf>,
    pub coverage_tools_dir: Option<PathBuf>,

    /// Seconds between two result store polls while waiting for jobs.
    /// 等待作业时两次轮询结果存储之间的秒数。
    pub poll_interval_secs: u64,

    /// File extensions recognized as facet config documents.
    /// 被识别为 facet 配置文档的文件扩展名。
    pub config_extensions: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            language: None,
            schedule_command: "suite-schedule".to_string(),
            coverage_command: "suite-coverage".to_string(),
            sendmail_command: "/usr/sbin/sendmail -t -i".to_string(),
            results_sending_email: "suite-runner@localhost".to_string(),
            coverage_output_dir: None,
            coverage_html_dir: None,
            coverage_tools_dir: None,
            poll_interval_secs: 10,
            config_extensions: vec!["yaml".to_string()],
        }
    }
}

impl RunnerConfig {
    /// The fixed interval of the completion poller.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Expands `~` and environment variables in every configured directory.
    fn expand_paths(mut self) -> Result<Self, ConfigError> {
        for dir in [
            &mut self.coverage_output_dir,
            &mut self.coverage_html_dir,
            &mut self.coverage_tools_dir,
        ] {
            if let Some(path) = dir.as_mut() {
                *path = expand_path(path)?;
            }
        }
        Ok(self)
    }
}

/// Expands `~` and `$VARS` in a path.
pub fn expand_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let raw = path.to_string_lossy();
    shellexpand::full(&raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|_| ConfigError::Expand(raw.to_string()))
}

/// Loads the runner configuration.
///
/// An explicitly requested file must exist. When no file is requested, the
/// default location is tried and built-in defaults are used if it is absent.
///
/// 加载运行器配置。显式指定的文件必须存在；未指定时尝试默认位置，
/// 若不存在则使用内置默认值。
pub fn load_runner_config(path: Option<&Path>) -> Result<RunnerConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (expand_path(path)?, true),
        None => (expand_path(Path::new(DEFAULT_CONFIG_PATH))?, false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(RunnerConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    let config: RunnerConfig =
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })?;
    config.expand_paths()
}

/// The top-level unit of one scheduling invocation.
/// 单次调度调用的顶层单元。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteRun {
    /// Correlation key in the queue and in the result store path.
    pub name: String,
    pub owner: Option<String>,
    /// Config documents applied to every job, ahead of the job's own configs.
    /// 应用于每个作业的配置文档，排在作业自身配置之前。
    pub override_config_paths: Vec<PathBuf>,
    pub timeout_seconds: Option<u64>,
    pub notify_address: Option<String>,
    /// How many times each job is submitted.
    pub sequence_count: u32,
    pub verbose: bool,
}

impl SuiteRun {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence_count: 1,
            ..Self::default()
        }
    }
}
