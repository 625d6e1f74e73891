//! Integration tests for configuration loading and graceful degradation
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Tests that manipulate ETHNOPATH_CONFIG are marked with #[serial].

use ethnopath_common::config::{
    load_toml_config, write_toml_config, ConfigResolver, IntegritySection, LoggingConfig,
    TomlConfig, CONFIG_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn sample_config() -> TomlConfig {
    TomlConfig {
        logging: LoggingConfig {
            level: "debug".to_string(),
            file: None,
        },
        output_path: Some(PathBuf::from("/tmp/ethnopath/results.json")),
        submission_timeout_ms: Some(500),
        max_concurrent_submissions: Some(4),
        integrity: Some(IntegritySection {
            compliance_weight: 0.1,
            confidence_weight: 0.6,
            retention_weight: 0.3,
        }),
    }
}

#[test]
fn test_write_then_load_preserves_fields() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("digitizer.toml");

    write_toml_config(&sample_config(), &path).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("toml.tmp").exists(), "temp file should be renamed away");

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded, sample_config());
}

#[test]
fn test_malformed_toml_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "submission_timeout_ms = \"soon\"").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
#[serial]
fn test_missing_file_degrades_to_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let resolver = ConfigResolver::new("digitizer");
    let missing = PathBuf::from("/nonexistent/ethnopath/digitizer.toml");

    let config = resolver.load_or_default(Some(&missing));
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_env_var_names_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("from-env.toml");
    write_toml_config(&sample_config(), &path).unwrap();

    env::set_var(CONFIG_ENV_VAR, &path);
    let resolver = ConfigResolver::new("digitizer");
    let resolved = resolver.resolve(None);
    let config = resolver.load_or_default(None);
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(resolved, Some(path));
    assert_eq!(config.submission_timeout_ms, Some(500));
}

#[test]
#[serial]
fn test_cli_arg_overrides_env_var() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");
    let resolver = ConfigResolver::new("digitizer");
    let cli = PathBuf::from("/tmp/from-cli.toml");
    let resolved = resolver.resolve(Some(&cli));
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(resolved, Some(cli));
}
