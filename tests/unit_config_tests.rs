use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

use suite_runner::core::config::{ConfigError, RunnerConfig, SuiteRun, load_runner_config};

/// An empty file is a complete configuration.
/// 空文件也是完整的配置。
#[test]
fn test_empty_config_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runner.toml");
    fs::write(&path, "").unwrap();

    let config = load_runner_config(Some(&path)).unwrap();

    assert_eq!(config, RunnerConfig::default());
    assert_eq!(config.poll_interval(), Duration::from_secs(10));
    assert_eq!(config.config_extensions, ["yaml"]);
}

#[test]
fn test_config_overrides() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runner.toml");
    fs::write(
        &path,
        r#"
language = "zh-CN"
schedule_command = "queue-job --tube nightly"
results_sending_email = "lab@example.com"
coverage_output_dir = "/srv/coverage"
poll_interval_secs = 0
config_extensions = ["yaml", "yml"]
"#,
    )
    .unwrap();

    let config = load_runner_config(Some(&path)).unwrap();

    assert_eq!(config.language.as_deref(), Some("zh-CN"));
    assert_eq!(config.schedule_command, "queue-job --tube nightly");
    assert_eq!(config.results_sending_email, "lab@example.com");
    assert_eq!(config.coverage_output_dir, Some(PathBuf::from("/srv/coverage")));
    assert_eq!(config.coverage_html_dir, None);
    // Clamped to at least one second.
    assert_eq!(config.poll_interval(), Duration::from_secs(1));
    assert_eq!(config.config_extensions, ["yaml", "yml"]);
}

#[test]
fn test_explicit_missing_config_is_an_error() {
    let dir = tempdir().unwrap();

    let err = load_runner_config(Some(&dir.path().join("absent.toml"))).unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runner.toml");
    fs::write(&path, "poll_interval_secs = \"soon\"\n").unwrap();

    let err = load_runner_config(Some(&path)).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_unset_variable_in_directory_fails_expansion() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runner.toml");
    fs::write(
        &path,
        "coverage_tools_dir = \"$SUITE_RUNNER_SURELY_UNSET_VARIABLE/tools\"\n",
    )
    .unwrap();

    let err = load_runner_config(Some(&path)).unwrap_err();

    assert!(matches!(err, ConfigError::Expand(_)));
}

#[test]
fn test_suite_run_defaults_to_one_repetition() {
    let suite = SuiteRun::new("nightly");

    assert_eq!(suite.name, "nightly");
    assert_eq!(suite.sequence_count, 1);
    assert!(suite.override_config_paths.is_empty());
}
