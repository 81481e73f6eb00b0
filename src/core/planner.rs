//! # Matrix Planner Module / 矩阵计划模块
//!
//! This module expands collections into the Cartesian product of their
//! facet configs. Output order and description strings are deterministic:
//! collections are sorted by name, facets and configs keep the lexical order
//! the tree reader produced, and earlier facets vary slower.
//!
//! 此模块将 collection 展开为其 facet 配置的笛卡尔积。
//! 输出顺序和描述字符串是确定的：collection 按名称排序，
//! facet 和配置保持目录读取器产生的字典序，且靠前的 facet 变化较慢。

use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::core::collection::{Collection, FacetConfig};

/// One facet config chosen for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetChoice {
    pub facet: String,
    pub config: String,
    pub path: PathBuf,
}

/// One fully-resolved combination of facet configs to execute.
/// 一个需要执行的、完全确定的 facet 配置组合。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub collection_name: String,
    pub choices: Vec<FacetChoice>,
    /// Human-visible correlation key, byte-identical across runs.
    /// 人类可读的关联键，在多次运行中逐字节一致。
    pub description: String,
    /// How many times this exact job is submitted.
    pub sequence_count: u32,
}

impl JobSpec {
    fn new(collection_name: &str, choices: Vec<FacetChoice>, sequence_count: u32) -> Self {
        let description = describe(collection_name, &choices);
        Self {
            collection_name: collection_name.to_string(),
            choices,
            description,
            sequence_count,
        }
    }

    /// The job's own config documents, in facet order.
    pub fn config_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.choices.iter().map(|choice| &choice.path)
    }
}

/// Builds `collection:<name> <facet1>:<config1> <facet2>:<config2> ...`.
pub fn describe(collection_name: &str, choices: &[FacetChoice]) -> String {
    let facets = choices
        .iter()
        .map(|choice| format!("{}:{}", choice.facet, choice.config))
        .collect::<Vec<_>>()
        .join(" ");
    format!("collection:{collection_name} {facets}")
}

/// Irregularities found while planning. None of them abort the run, but
/// every one is surfaced instead of silently producing fewer jobs.
///
/// 计划过程中发现的异常。它们不会中止运行，但每一个都会被报告，
/// 而不是悄悄地产生更少的作业。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAnomaly {
    /// A facet without configs makes its collection contribute zero jobs.
    EmptyFacet { collection: String, facet: String },
}

impl fmt::Display for PlanAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanAnomaly::EmptyFacet { collection, facet } => write!(
                f,
                "facet '{facet}' in collection '{collection}' has no configs; the collection yields no jobs"
            ),
        }
    }
}

/// Represents the complete job matrix of a suite.
/// 表示一个套件的完整作业矩阵。
#[derive(Debug, Default)]
pub struct SuitePlan {
    pub jobs: Vec<JobSpec>,
    pub anomalies: Vec<PlanAnomaly>,
}

impl SuitePlan {
    /// Total number of submissions, repetitions included.
    pub fn submission_count(&self) -> usize {
        self.jobs
            .iter()
            .map(|job| job.sequence_count as usize)
            .sum()
    }
}

/// Computes the Cartesian product of one collection's facets.
///
/// A collection with no facets yields exactly one job with an empty suffix;
/// a facet with no configs yields no jobs and an anomaly.
pub fn expand_collection(
    collection: &Collection,
    sequence_count: u32,
) -> (Vec<JobSpec>, Vec<PlanAnomaly>) {
    let anomalies: Vec<_> = collection
        .facets
        .iter()
        .filter(|facet| facet.configs.is_empty())
        .map(|facet| PlanAnomaly::EmptyFacet {
            collection: collection.name.clone(),
            facet: facet.name.clone(),
        })
        .collect();
    if !anomalies.is_empty() {
        return (Vec::new(), anomalies);
    }

    let mut combinations: Vec<Vec<FacetChoice>> = vec![Vec::new()];
    for facet in &collection.facets {
        combinations = combinations
            .into_iter()
            .flat_map(|prefix| {
                facet.configs.iter().map(move |FacetConfig { name, path }| {
                    let mut choices = prefix.clone();
                    choices.push(FacetChoice {
                        facet: facet.name.clone(),
                        config: name.clone(),
                        path: path.clone(),
                    });
                    choices
                })
            })
            .collect();
    }

    let jobs = combinations
        .into_iter()
        .map(|choices| JobSpec::new(&collection.name, choices, sequence_count))
        .collect();
    (jobs, Vec::new())
}

/// Creates the job matrix for all collections of a suite.
///
/// # Arguments
/// * `collections` - Collections as read from disk, in any order
/// * `sequence_count` - Repetitions of every job (`--num`)
pub fn plan_suite(mut collections: Vec<Collection>, sequence_count: u32) -> SuitePlan {
    collections.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));

    let mut plan = SuitePlan::default();
    for collection in &collections {
        info!(
            "Collection {} in {}",
            collection.name,
            collection.path.display()
        );
        let (jobs, anomalies) = expand_collection(collection, sequence_count);
        for anomaly in &anomalies {
            warn!("{anomaly}");
        }
        plan.jobs.extend(jobs);
        plan.anomalies.extend(anomalies);
    }
    plan
}
