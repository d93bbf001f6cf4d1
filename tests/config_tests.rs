//! Integration tests for configuration loading from disk.

use std::fs;
use std::path::PathBuf;

use wearwolf::app::Config;
use wearwolf::error::{ConfigError, Error};

const TEMPLATE: &str = include_str!("../config.toml.example");

fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn test_shipped_template_loads_as_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, TEMPLATE);

    let config = Config::load(&path).unwrap();
    let defaults = Config::default();
    assert_eq!(config.epoch.length_secs, defaults.epoch.length_secs);
    assert_eq!(config.algorithms.enabled, defaults.algorithms.enabled);
    assert_eq!(config.compare.resolution_secs, defaults.compare.resolution_secs);
    assert_eq!(config.logging.level, defaults.logging.level);
}

#[test]
fn test_loaded_overrides_reach_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
        [algorithms]
        enabled = ["choi_2011", "hecht_2009"]

        [algorithms.choi_2011]
        min_period_minutes = 120
        "#,
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.algorithms.choi_2011.min_period_minutes, 120);
    // untouched parameters keep their defaults
    assert_eq!(config.algorithms.choi_2011.min_window_minutes, 30);

    let registry = config.registry().unwrap();
    let names: Vec<_> = registry.algorithms().iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["choi_2011", "hecht_2009"]);
}

#[test]
fn test_load_rejects_unknown_algorithm_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[algorithms]\nenabled = [\"actiwatch_1998\"]\n");

    match Config::load(&path) {
        Err(Error::Config(ConfigError::UnknownAlgorithm { name })) => {
            assert_eq!(name, "actiwatch_1998");
        }
        other => panic!("expected UnknownAlgorithm, got {other:?}"),
    }
}

#[test]
fn test_load_rejects_zero_epoch_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[epoch]\nlength_secs = 0\n");

    let result = Config::load(&path);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "epoch.length_secs",
            ..
        }))
    ));
}

#[test]
fn test_load_keeps_broken_toml_for_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let source = "[epoch\nlength_secs = 60\n";
    let path = write_config(&dir, source);

    match Config::load(&path) {
        Err(Error::Config(ConfigError::Parse { content, .. })) => {
            assert_eq!(content, source);
        }
        other => panic!("expected Parse error, got {other:?}"),
    }
}

#[test]
fn test_missing_file_falls_back_only_when_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("absent.toml");

    let config = Config::load_if_exists(&absent).unwrap();
    assert_eq!(config.epoch.length_secs, 60);

    assert!(matches!(
        Config::load(&absent),
        Err(Error::Config(ConfigError::ReadFile { .. }))
    ));
}
