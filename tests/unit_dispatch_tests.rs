use std::path::PathBuf;

use suite_runner::core::collection::{Collection, Facet, FacetConfig};
use suite_runner::core::config::SuiteRun;
use suite_runner::core::dispatch::{JobKind, build_descriptors, dispatch_suite};
use suite_runner::core::planner::{SuitePlan, plan_suite};

mod common;
use common::RecordingQueue;

fn two_job_plan(sequence_count: u32) -> SuitePlan {
    let facet = Facet {
        name: "fs".to_string(),
        configs: ["btrfs.yaml", "xfs.yaml"]
            .iter()
            .map(|name| FacetConfig {
                name: name.to_string(),
                path: PathBuf::from(format!("/suites/smoke/fs/{name}")),
            })
            .collect(),
    };
    let collection = Collection {
        name: "smoke".to_string(),
        path: PathBuf::from("/suites/smoke"),
        facets: vec![facet],
    };
    plan_suite(vec![collection], sequence_count)
}

fn suite() -> SuiteRun {
    SuiteRun {
        owner: Some("alice".to_string()),
        override_config_paths: vec![PathBuf::from("/overrides/base.yaml")],
        timeout_seconds: Some(600),
        notify_address: Some("qa@example.com".to_string()),
        ..SuiteRun::new("nightly")
    }
}

/// Overrides come before the job's own configs so that the job's configs
/// win when the executor merges them.
///
/// 覆盖配置排在作业自身配置之前，使执行器合并时作业自身配置优先。
#[test]
fn test_override_configs_come_first() {
    let descriptors = build_descriptors(&suite(), &two_job_plan(1));

    match &descriptors[0].kind {
        JobKind::Regular {
            description,
            config_paths,
        } => {
            assert_eq!(description, "collection:smoke fs:btrfs.yaml");
            assert_eq!(
                config_paths,
                &[
                    PathBuf::from("/overrides/base.yaml"),
                    PathBuf::from("/suites/smoke/fs/btrfs.yaml"),
                ]
            );
        }
        other => panic!("expected a regular job, got {other:?}"),
    }
}

#[test]
fn test_regular_job_arguments() {
    let descriptors = build_descriptors(&suite(), &two_job_plan(1));

    assert_eq!(
        descriptors[1].to_args(),
        [
            "--name",
            "nightly",
            "--num",
            "1",
            "--owner",
            "alice",
            "--description",
            "collection:smoke fs:xfs.yaml",
            "--",
            "/overrides/base.yaml",
            "/suites/smoke/fs/xfs.yaml",
        ]
    );
}

#[test]
fn test_marker_is_last_with_suite_settings() {
    let descriptors = build_descriptors(&suite(), &two_job_plan(1));

    let marker = descriptors.last().unwrap();
    assert!(marker.is_last_in_suite());
    assert_eq!(descriptors.iter().filter(|d| d.is_last_in_suite()).count(), 1);
    assert_eq!(
        marker.to_args(),
        [
            "--name",
            "nightly",
            "--num",
            "1",
            "--owner",
            "alice",
            "--last-in-suite",
            "--email",
            "qa@example.com",
            "--timeout",
            "600",
        ]
    );
}

#[test]
fn test_verbose_flag_is_forwarded() {
    let suite = SuiteRun {
        verbose: true,
        ..SuiteRun::new("v")
    };

    let args = build_descriptors(&suite, &SuitePlan::default())[0].to_args();

    assert_eq!(args, ["--name", "v", "--num", "1", "-v", "--last-in-suite"]);
}

/// Every repetition is its own submission, adjacent to its siblings.
/// 每次重复都是一次独立的提交，并与同组的提交相邻。
#[tokio::test]
async fn test_repetitions_are_separate_submissions() {
    let mut queue = RecordingQueue::default();

    let report = dispatch_suite(&mut queue, &suite(), &two_job_plan(2))
        .await
        .unwrap();

    assert_eq!(queue.submitted.len(), 2 * 2 + 1);
    assert!(queue.submitted.iter().all(|d| d.num == 1));
    let descriptions: Vec<_> = report.submitted.iter().map(|(_, d)| d.as_str()).collect();
    assert_eq!(
        descriptions,
        [
            "collection:smoke fs:btrfs.yaml",
            "collection:smoke fs:btrfs.yaml",
            "collection:smoke fs:xfs.yaml",
            "collection:smoke fs:xfs.yaml",
        ]
    );
    assert_eq!(report.marker.as_ref().map(|m| m.as_str()), Some("job-5"));
    assert!(queue.submitted.last().unwrap().is_last_in_suite());
}

/// A failed submission stops dispatch; the marker is never queued.
/// 提交失败会停止分发；标记作业永远不会被提交。
#[tokio::test]
async fn test_failed_submission_aborts_without_marker() {
    let mut queue = RecordingQueue {
        fail_at: Some(1),
        ..RecordingQueue::default()
    };

    let err = dispatch_suite(&mut queue, &suite(), &two_job_plan(1))
        .await
        .unwrap_err();

    assert_eq!(err.submitted, 1);
    assert!(err.to_string().contains("submission #2"));
    assert_eq!(queue.submitted.len(), 1);
    assert!(!queue.submitted.iter().any(|d| d.is_last_in_suite()));
}

#[tokio::test]
async fn test_empty_plan_still_queues_marker() {
    let mut queue = RecordingQueue::default();

    let report = dispatch_suite(&mut queue, &SuiteRun::new("empty"), &SuitePlan::default())
        .await
        .unwrap();

    assert!(report.submitted.is_empty());
    assert!(report.marker.is_some());
}
