//! Digitizer configuration
//!
//! Derives the runtime settings from the bootstrap TOML file, then applies
//! environment overrides:
//! - `ETHNOPATH_OUTPUT`: export path
//! - `ETHNOPATH_TIMEOUT_MS`: per-submission wall-clock budget

use crate::error::{DigitizeError, Result};
use crate::export::DEFAULT_EXPORT_PATH;
use crate::graph::IntegrityWeights;
use crate::workflow::pipeline::DEFAULT_MAX_CONCURRENT_SUBMISSIONS;
use crate::workflow::PipelineConfig;
use ethnopath_common::config::TomlConfig;
use ethnopath_common::time::millis_to_duration;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable overriding the export path
pub const OUTPUT_ENV_VAR: &str = "ETHNOPATH_OUTPUT";

/// Environment variable overriding the per-submission budget
pub const TIMEOUT_ENV_VAR: &str = "ETHNOPATH_TIMEOUT_MS";

/// Resolved digitizer settings
#[derive(Debug, Clone, PartialEq)]
pub struct DigitizerConfig {
    pub pipeline: PipelineConfig,
    pub output_path: PathBuf,
}

impl DigitizerConfig {
    /// Build from the bootstrap file, without environment overrides
    pub fn from_toml(toml: &TomlConfig) -> Result<Self> {
        let integrity_weights = toml
            .integrity
            .map(|section| IntegrityWeights {
                compliance: section.compliance_weight,
                confidence: section.confidence_weight,
                retention: section.retention_weight,
            })
            .unwrap_or_default();

        let pipeline = PipelineConfig {
            submission_timeout: toml.submission_timeout_ms.map(millis_to_duration),
            max_concurrent_submissions: toml
                .max_concurrent_submissions
                .unwrap_or(DEFAULT_MAX_CONCURRENT_SUBMISSIONS),
            integrity_weights,
        };
        pipeline.validate()?;

        Ok(Self {
            pipeline,
            output_path: toml
                .output_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH)),
        })
    }

    /// Build from the bootstrap file and apply environment overrides
    pub fn resolve(toml: &TomlConfig) -> Result<Self> {
        let mut config = Self::from_toml(toml)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var(OUTPUT_ENV_VAR) {
            if !path.trim().is_empty() {
                debug!("Export path from {}: {}", OUTPUT_ENV_VAR, path);
                self.output_path = PathBuf::from(path);
            }
        }

        if let Ok(value) = std::env::var(TIMEOUT_ENV_VAR) {
            let millis: u64 = value.trim().parse().map_err(|_| {
                DigitizeError::Config(format!(
                    "{} must be a whole number of milliseconds, got '{}'",
                    TIMEOUT_ENV_VAR, value
                ))
            })?;
            debug!("Submission timeout from {}: {}ms", TIMEOUT_ENV_VAR, millis);
            self.pipeline.submission_timeout = Some(millis_to_duration(millis));
        }

        Ok(())
    }
}
