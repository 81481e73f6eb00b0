//! # Command Execution Module / 命令执行模块
//!
//! External programs the runner drives: the job queue, the mail transport
//! and the coverage generator. Commands come from the runner configuration
//! as shell-like strings and are expanded with `shellexpand` and split with
//! `shlex` before being spawned.
//!
//! 运行器驱动的外部程序：作业队列、邮件传输程序和覆盖率生成器。
//! 命令以类 shell 字符串的形式来自运行器配置，在启动前使用 `shellexpand` 展开，
//! 并用 `shlex` 拆分。

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::core::dispatch::{JobDescriptor, JobQueueClient, SubmitError};
use crate::core::models::JobId;
use crate::reporting::notify::{
    CoverageError, CoverageLauncher, CoverageRequest, Notification, NotifyError, Notifier,
};

/// Splits a configured command line into program and arguments.
///
/// Returns `None` for an empty or unparsable command.
///
/// 将配置的命令行拆分为程序和参数。命令为空或无法解析时返回 `None`。
pub fn split_command(command: &str) -> Option<(String, Vec<String>)> {
    let expanded = shellexpand::full(command)
        .map(|s| s.to_string())
        .unwrap_or_else(|_| command.to_string());
    let mut parts = shlex::split(&expanded)?;
    if parts.is_empty() {
        return None;
    }
    let program = parts.remove(0);
    Some((program, parts))
}

/// Output of a finished child process.
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Spawns a command, captures its stdout and stderr.
/// The output streams are read concurrently, each into its own buffer.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 两个输出流被并发读取，各自写入独立的缓冲区。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
    stdin_payload: Option<String>,
) -> std::io::Result<Captured> {
    let mut child = cmd
        .stdin(if stdin_payload.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("failed to capture stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("failed to capture stderr"))?;

    let stdout_buf = Arc::new(tokio::sync::Mutex::new(String::new()));
    let stderr_buf = Arc::new(tokio::sync::Mutex::new(String::new()));

    let stdout_output = Arc::clone(&stdout_buf);
    let stdout_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stdout_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let stderr_output = Arc::clone(&stderr_buf);
    let stderr_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(target: "suite_runner::child", "{line}");
            let mut output = stderr_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    if let (Some(payload), Some(mut stdin)) = (stdin_payload, child.stdin.take()) {
        match stdin.write_all(payload.as_bytes()).await {
            Ok(()) => {}
            // The child may exit without reading its input; its status tells the rest.
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!("child closed stdin early: {e}");
            }
            Err(e) => return Err(e),
        }
        // Closing stdin signals end of input.
        drop(stdin);
    }

    let status = child.wait().await?;

    // Make sure every line has been read before handing the buffers back.
    if let Err(e) = stdout_handle.await {
        debug!("failed to join stdout task: {e}");
    }
    if let Err(e) = stderr_handle.await {
        debug!("failed to join stderr task: {e}");
    }

    let stdout = stdout_buf.lock().await.clone();
    let stderr = stderr_buf.lock().await.clone();
    Ok(Captured {
        status,
        stdout,
        stderr,
    })
}

/// Queues jobs by invoking the external schedule program once per job.
/// 通过为每个作业调用一次外部调度程序来将作业加入队列。
#[derive(Debug, Clone)]
pub struct ProcessQueueClient {
    program: String,
    base_args: Vec<String>,
    submitted: usize,
}

impl ProcessQueueClient {
    pub fn new(command: &str) -> Result<Self, SubmitError> {
        let (program, base_args) = split_command(command).ok_or(SubmitError::EmptyCommand)?;
        Ok(Self {
            program,
            base_args,
            submitted: 0,
        })
    }
}

impl JobQueueClient for ProcessQueueClient {
    async fn submit(&mut self, job: &JobDescriptor) -> Result<JobId, SubmitError> {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.base_args).args(job.to_args());
        debug!(program = %self.program, args = ?job.to_args(), "submitting");

        let captured = spawn_and_capture(cmd, None)
            .await
            .map_err(|source| SubmitError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !captured.status.success() {
            return Err(SubmitError::Rejected {
                status: captured.status.to_string(),
                stderr: captured.stderr.trim().to_string(),
            });
        }

        self.submitted += 1;
        // The queue may print the id it assigned; fall back to a sequence id.
        let id = captured
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .next_back()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}-{}", job.suite_name, self.submitted));
        Ok(JobId(id))
    }
}

/// Prints every submission instead of queueing it.
/// 打印每次提交而不是实际加入队列。
#[derive(Debug, Clone)]
pub struct DryRunQueueClient {
    program: String,
    submitted: usize,
}

impl DryRunQueueClient {
    pub fn new(command: &str) -> Self {
        let program = split_command(command)
            .map(|(program, args)| {
                std::iter::once(program)
                    .chain(args)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        Self {
            program,
            submitted: 0,
        }
    }
}

impl JobQueueClient for DryRunQueueClient {
    async fn submit(&mut self, job: &JobDescriptor) -> Result<JobId, SubmitError> {
        self.submitted += 1;
        let args = job
            .to_args()
            .iter()
            .map(|arg| shlex::try_quote(arg).map(|q| q.into_owned()).unwrap_or_else(|_| arg.clone()))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{} {}", self.program, args);
        Ok(JobId(format!("dry-run-{}", self.submitted)))
    }
}

/// Hands mail to a sendmail-compatible program on its standard input.
#[derive(Debug, Clone)]
pub struct SendmailNotifier {
    command: String,
}

impl SendmailNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Notifier for SendmailNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let (program, args) = split_command(&self.command).ok_or(NotifyError::EmptyCommand)?;
        let mut cmd = tokio::process::Command::new(&program);
        cmd.args(&args);

        let captured = spawn_and_capture(cmd, Some(notification.to_message()))
            .await
            .map_err(|source| NotifyError::Spawn {
                program: program.clone(),
                source,
            })?;
        if !captured.status.success() {
            return Err(NotifyError::Failed {
                status: captured.status.to_string(),
                stderr: captured.stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Spawns the coverage generator detached; the runner never waits on it.
#[derive(Debug, Clone)]
pub struct ProcessCoverageLauncher {
    command: String,
}

impl ProcessCoverageLauncher {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl CoverageLauncher for ProcessCoverageLauncher {
    fn launch(&self, request: &CoverageRequest) -> Result<(), CoverageError> {
        let (program, args) = split_command(&self.command).ok_or(CoverageError::EmptyCommand)?;
        let child = std::process::Command::new(&program)
            .args(&args)
            .args(request.to_args())
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| CoverageError::Spawn {
                program: program.clone(),
                source,
            })?;
        info!(pid = child.id(), "coverage generation started");
        Ok(())
    }
}
