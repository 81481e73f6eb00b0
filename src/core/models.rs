//! # Data Models Module / 数据模型模块
//!
//! This module defines the job identifiers, the typed job summary that
//! executors write into the result store, and the derived per-job outcome.
//!
//! 此模块定义作业标识符、执行器写入结果存储的类型化作业摘要，
//! 以及派生的单个作业结果。

use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies one job: its subdirectory name in the result store, or the
/// id the queue handed back on submission.
/// 标识一个作业：结果存储中的子目录名，或提交时队列返回的 id。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Merges summary fragments in order; a later fragment's keys overwrite
/// earlier ones. Fragments that are not mappings (e.g. empty documents)
/// are skipped.
///
/// 按顺序合并摘要片段；后出现片段的键覆盖先前的键。
/// 非映射片段（例如空文档）会被跳过。
pub fn merge_fragments<I>(fragments: I) -> Mapping
where
    I: IntoIterator<Item = Value>,
{
    let mut merged = Mapping::new();
    for fragment in fragments {
        if let Value::Mapping(map) = fragment {
            for (key, value) in map {
                merged.insert(key, value);
            }
        }
    }
    merged
}

/// Parses a stream of `---`-separated YAML documents and merges them.
pub fn parse_fragments(text: &str) -> Result<Mapping, serde_yaml_ng::Error> {
    let mut fragments = Vec::new();
    for document in serde_yaml_ng::Deserializer::from_str(text) {
        fragments.push(Value::deserialize(document)?);
    }
    Ok(merge_fragments(fragments))
}

/// Structured outcome document for one executed job.
///
/// Built from the merged fragments; keys the runner does not know are kept
/// in `extra` and otherwise ignored.
///
/// 单个已执行作业的结构化结果文档。
/// 由合并后的片段构建；运行器不认识的键保存在 `extra` 中并被忽略。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobSummary {
    pub description: Option<String>,
    /// Absent or non-boolean values count as `false`.
    pub success: bool,
    /// Seconds; 0 when absent.
    pub duration: f64,
    pub owner: Option<String>,
    pub failure_reason: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl JobSummary {
    pub fn from_mapping(mapping: Mapping) -> Self {
        let mut summary = JobSummary::default();
        for (key, value) in mapping {
            let Some(key) = key.as_str().map(str::to_string) else {
                continue;
            };
            match key.as_str() {
                "description" => summary.description = scalar_to_string(&value),
                "success" => summary.success = value.as_bool().unwrap_or(false),
                "duration" => summary.duration = value.as_f64().unwrap_or(0.0),
                "owner" => summary.owner = scalar_to_string(&value),
                "failure_reason" => summary.failure_reason = scalar_to_string(&value),
                _ => {
                    summary.extra.insert(key, value);
                }
            }
        }
        summary
    }

    /// Parses a summary document stream (see [`parse_fragments`]).
    pub fn parse(text: &str) -> Result<Self, serde_yaml_ng::Error> {
        parse_fragments(text).map(Self::from_mapping)
    }

    /// Whole seconds, truncated.
    pub fn duration_secs(&self) -> u64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            self.duration as u64
        } else {
            0
        }
    }

    pub fn description_or_dash(&self) -> &str {
        self.description.as_deref().unwrap_or("-")
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The derived classification of one job. Not stored anywhere.
/// 单个作业的派生分类结果，不会被存储。
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Passed {
        job: JobId,
        duration_secs: u64,
        description: String,
    },
    Failed {
        job: JobId,
        duration_secs: u64,
        description: String,
        reason: Option<String>,
    },
    /// No summary after the wait/grace period.
    Hung { job: JobId },
}

impl JobOutcome {
    pub fn job(&self) -> &JobId {
        match self {
            JobOutcome::Passed { job, .. }
            | JobOutcome::Failed { job, .. }
            | JobOutcome::Hung { job } => job,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, JobOutcome::Passed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, JobOutcome::Failed { .. })
    }

    pub fn is_hung(&self) -> bool {
        matches!(self, JobOutcome::Hung { .. })
    }
}
