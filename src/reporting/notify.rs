//! # Notification Module / 通知模块
//!
//! Fire-and-forget side effects of a finished report: mailing it to the
//! suite's notify address and kicking off coverage-report generation.
//! Both are always attempted; a mail failure never suppresses coverage.
//!
//! 报告完成后的即发即弃副作用：将报告邮寄到套件的通知地址，并启动覆盖率报告生成。
//! 两者总会被尝试；邮件发送失败绝不会阻止覆盖率生成。

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::config::RunnerConfig;
use crate::reporting::report::SuiteReport;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to launch mail transport '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to hand the message to the mail transport: {0}")]
    Io(#[from] std::io::Error),

    #[error("mail transport exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("mail transport command is empty")]
    EmptyCommand,
}

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("coverage is not configured: `{0}` is missing")]
    NotConfigured(&'static str),

    #[error("failed to launch coverage command '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("coverage command is empty")]
    EmptyCommand,
}

/// A plain-text mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Renders an RFC 5322 message suitable for `sendmail -t`.
    pub fn to_message(&self) -> String {
        format!(
            "From: {}\nTo: {}\nSubject: {}\nContent-Type: text/plain; charset=utf-8\n\n{}\n",
            self.from, self.to, self.subject, self.body
        )
    }
}

#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Where coverage output for a suite goes.
/// 套件覆盖率输出的位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRequest {
    pub archive_dir: PathBuf,
    /// `<coverage_output_dir>/<suite>`
    pub output_dir: PathBuf,
    /// `<coverage_html_dir>/<suite>`
    pub html_dir: PathBuf,
    pub tools_dir: PathBuf,
}

impl CoverageRequest {
    /// Selects per-suite output subdirectories from the runner configuration.
    pub fn for_suite(
        config: &RunnerConfig,
        suite_name: &str,
        archive_dir: &Path,
    ) -> Result<Self, CoverageError> {
        let output_root = config
            .coverage_output_dir
            .as_ref()
            .ok_or(CoverageError::NotConfigured("coverage_output_dir"))?;
        let html_root = config
            .coverage_html_dir
            .as_ref()
            .ok_or(CoverageError::NotConfigured("coverage_html_dir"))?;
        let tools_dir = config
            .coverage_tools_dir
            .as_ref()
            .ok_or(CoverageError::NotConfigured("coverage_tools_dir"))?;

        Ok(Self {
            archive_dir: archive_dir.to_path_buf(),
            output_dir: output_root.join(suite_name),
            html_dir: html_root.join(suite_name),
            tools_dir: tools_dir.clone(),
        })
    }

    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-v".to_string(),
            "-o".to_string(),
            self.output_dir.display().to_string(),
            "--html-output".to_string(),
            self.html_dir.display().to_string(),
            "--cov-tools-dir".to_string(),
            self.tools_dir.display().to_string(),
            self.archive_dir.display().to_string(),
        ]
    }
}

/// Starts coverage generation in the background; does not wait for it.
pub trait CoverageLauncher {
    fn launch(&self, request: &CoverageRequest) -> Result<(), CoverageError>;
}

/// Everything `publish` needs besides the report itself.
#[derive(Debug, Clone)]
pub struct PublishContext<'a> {
    pub config: &'a RunnerConfig,
    pub archive_dir: &'a Path,
    pub notify_address: Option<&'a str>,
}

/// What happened to each side effect.
#[derive(Debug)]
pub struct PublishOutcome {
    /// `None` when no notify address was set.
    pub notification: Option<Result<(), NotifyError>>,
    pub coverage: Result<(), CoverageError>,
}

impl PublishOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.coverage.is_ok() && !matches!(self.notification, Some(Err(_)))
    }
}

/// Mails the report (when an address is set) and then, unconditionally,
/// triggers coverage generation. Failures are logged and returned, never
/// raised.
///
/// 邮寄报告（若设置了地址），然后无条件触发覆盖率生成。
/// 失败会被记录并返回，但不会抛出。
pub async fn publish<N: Notifier, L: CoverageLauncher>(
    report: &SuiteReport,
    ctx: &PublishContext<'_>,
    notifier: &N,
    launcher: &L,
) -> PublishOutcome {
    let notification = match ctx.notify_address {
        Some(to) => {
            let mail = Notification {
                from: ctx.config.results_sending_email.clone(),
                to: to.to_string(),
                subject: report.subject(),
                body: report.body(),
            };
            info!("Sending results to {to}: {}", mail.body);
            debug!("sending email {}", mail.to_message());
            let sent = notifier.send(&mail).await;
            if let Err(e) = &sent {
                warn!("failed to email results to {to}: {e}");
            }
            Some(sent)
        }
        None => None,
    };

    info!("starting coverage generation");
    let coverage = CoverageRequest::for_suite(ctx.config, &report.suite_name, ctx.archive_dir)
        .and_then(|request| launcher.launch(&request));
    if let Err(e) = &coverage {
        error!("coverage generation was not started: {e}");
    }

    PublishOutcome {
        notification,
        coverage,
    }
}
