//! Runtime configuration.
//!
//! Configuration is layered TOML where every table and key is optional:
//! an empty file, a missing file, and `Config::default()` all mean the
//! published defaults. Each algorithm keeps its parameters in its own
//! table so single values can be overridden without restating the rest.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::domain::algorithm::{
    AlgorithmRegistry, Choi2011Algorithm, Choi2011Config, Hecht2009Algorithm, Hecht2009Config,
    Hees2013Algorithm, Hees2013Config, Troiano2007Algorithm, Troiano2007Config, ALGORITHM_NAMES,
};
use crate::error::{ConfigError, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Epoch handling.
    #[serde(default)]
    pub epoch: EpochConfig,

    /// Algorithm selection and per-algorithm parameters.
    #[serde(default)]
    pub algorithms: AlgorithmsConfig,

    /// Comparison against reference annotations.
    #[serde(default)]
    pub compare: CompareConfig,

    /// Export destinations.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_toml(&content, path)
    }

    /// Load configuration from a TOML file, or fall back to defaults when
    /// the file does not exist.
    pub fn load_if_exists(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from TOML source. `origin` names
    /// the source in errors.
    pub fn parse_toml(content: &str, origin: &Path) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.display().to_string(),
            content: content.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.epoch.length_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "epoch.length_secs",
                reason: "epoch length must be positive".to_string(),
            }
            .into());
        }

        if self.compare.resolution_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "compare.resolution_secs",
                reason: "comparison resolution must be positive".to_string(),
            }
            .into());
        }

        for name in &self.algorithms.enabled {
            if !ALGORITHM_NAMES.contains(&name.as_str()) {
                return Err(ConfigError::UnknownAlgorithm { name: name.clone() }.into());
            }
        }

        if self.logging.level.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.level",
                reason: "log level must not be empty".to_string(),
            }
            .into());
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.format",
                    reason: format!("unknown format '{other}', expected 'pretty' or 'json'"),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Build a registry holding the configured `enabled` algorithms.
    pub fn registry(&self) -> Result<AlgorithmRegistry> {
        self.registry_for(&self.algorithms.enabled)
    }

    /// Build a registry for an explicit name list, in list order.
    ///
    /// Duplicate names register once; unknown names are rejected. Parameters
    /// come from the per-algorithm tables of this configuration.
    pub fn registry_for(&self, names: &[String]) -> Result<AlgorithmRegistry> {
        let mut registry = AlgorithmRegistry::new();
        let mut seen: Vec<&str> = Vec::new();

        for name in names {
            if seen.contains(&name.as_str()) {
                continue;
            }
            match name.as_str() {
                "hecht_2009" => registry.register(Box::new(Hecht2009Algorithm::new(
                    self.algorithms.hecht_2009.clone(),
                ))),
                "troiano_2007" => registry.register(Box::new(Troiano2007Algorithm::new(
                    self.algorithms.troiano_2007.clone(),
                ))),
                "choi_2011" => registry.register(Box::new(Choi2011Algorithm::new(
                    self.algorithms.choi_2011.clone(),
                ))),
                "hees_2013" => registry.register(Box::new(Hees2013Algorithm::new(
                    self.algorithms.hees_2013.clone(),
                ))),
                _ => return Err(ConfigError::UnknownAlgorithm { name: name.clone() }.into()),
            }
            seen.push(name.as_str());
        }

        Ok(registry)
    }
}

/// Epoch handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EpochConfig {
    /// Target epoch length in seconds for resampling.
    #[serde(default = "default_epoch_length_secs")]
    pub length_secs: u32,
}

fn default_epoch_length_secs() -> u32 {
    60
}

impl Default for EpochConfig {
    fn default() -> Self {
        Self {
            length_secs: default_epoch_length_secs(),
        }
    }
}

/// Algorithm selection and parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct AlgorithmsConfig {
    /// Algorithms to run, by name.
    #[serde(default = "default_enabled")]
    pub enabled: Vec<String>,

    #[serde(default)]
    pub hecht_2009: Hecht2009Config,

    #[serde(default)]
    pub troiano_2007: Troiano2007Config,

    #[serde(default)]
    pub choi_2011: Choi2011Config,

    #[serde(default)]
    pub hees_2013: Hees2013Config,
}

fn default_enabled() -> Vec<String> {
    ALGORITHM_NAMES.iter().map(|s| s.to_string()).collect()
}

// Manual impl keeps Config::default() and an empty TOML table in agreement.
impl Default for AlgorithmsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            hecht_2009: Hecht2009Config::default(),
            troiano_2007: Troiano2007Config::default(),
            choi_2011: Choi2011Config::default(),
            hees_2013: Hees2013Config::default(),
        }
    }
}

/// Comparison configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    /// Grid step in seconds that detections and references are resampled
    /// to before scoring.
    #[serde(default = "default_resolution_secs")]
    pub resolution_secs: u32,
}

fn default_resolution_secs() -> u32 {
    60
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            resolution_secs: default_resolution_secs(),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for exports that are not given an explicit path.
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Initialize the global tracing subscriber from this configuration.
    ///
    /// `RUST_LOG` overrides the configured level when set. Diagnostics go
    /// to stderr so stdout stays parseable. Repeated calls keep the first
    /// subscriber.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                let _ = fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .json()
                    .try_init();
            }
            _ => {
                let _ = fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .try_init();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn parse(content: &str) -> Result<Config> {
        Config::parse_toml(content, Path::new("test.toml"))
    }

    #[test]
    fn test_empty_source_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.epoch.length_secs, 60);
        assert_eq!(config.algorithms.enabled, ALGORITHM_NAMES);
        assert_eq!(config.compare.resolution_secs, 60);
        assert_eq!(config.output.directory, PathBuf::from("."));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_default_impl_matches_parsed_defaults() {
        let parsed = parse("").unwrap();
        let built = Config::default();
        assert_eq!(built.epoch.length_secs, parsed.epoch.length_secs);
        assert_eq!(built.algorithms.enabled, parsed.algorithms.enabled);
        assert_eq!(built.compare.resolution_secs, parsed.compare.resolution_secs);
        assert_eq!(built.logging.level, parsed.logging.level);
        assert_eq!(built.logging.format, parsed.logging.format);
    }

    #[test]
    fn test_partial_tables_override_single_values() {
        let config = parse(
            r#"
            [epoch]
            length_secs = 30

            [algorithms.troiano_2007]
            use_vector_magnitude = true
            spike_tolerance_minutes = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.epoch.length_secs, 30);
        assert!(config.algorithms.troiano_2007.use_vector_magnitude);
        assert_eq!(config.algorithms.troiano_2007.spike_tolerance_minutes, 5);
        // untouched values keep their defaults
        assert_eq!(config.algorithms.troiano_2007.min_period_minutes, 60);
        assert_eq!(config.algorithms.choi_2011.min_period_minutes, 90);
    }

    #[test]
    fn test_rejects_zero_epoch_length() {
        let result = parse("[epoch]\nlength_secs = 0\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "epoch.length_secs",
                ..
            }))
        ));
    }

    #[test]
    fn test_rejects_zero_resolution() {
        let result = parse("[compare]\nresolution_secs = 0\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "compare.resolution_secs",
                ..
            }))
        ));
    }

    #[test]
    fn test_rejects_unknown_enabled_algorithm() {
        let result = parse("[algorithms]\nenabled = [\"choi_2011\", \"mcfadden_1998\"]\n");
        match result {
            Err(Error::Config(ConfigError::UnknownAlgorithm { name })) => {
                assert_eq!(name, "mcfadden_1998");
            }
            other => panic!("expected UnknownAlgorithm, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_logging_format() {
        let result = parse("[logging]\nformat = \"xml\"\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "logging.format",
                ..
            }))
        ));
    }

    #[test]
    fn test_parse_error_carries_source_context() {
        let content = "[epoch\nlength_secs = 60\n";
        let result = parse(content);
        match result {
            Err(Error::Config(ConfigError::Parse { path, content: c, .. })) => {
                assert_eq!(path, "test.toml");
                assert_eq!(c, content);
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_registry_follows_enabled_list() {
        let config = parse("[algorithms]\nenabled = [\"hees_2013\", \"hecht_2009\"]\n").unwrap();
        let registry = config.registry().unwrap();
        let names: Vec<_> = registry.algorithms().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["hees_2013", "hecht_2009"]);
    }

    #[test]
    fn test_registry_for_deduplicates() {
        let config = Config::default();
        let names = vec!["choi_2011".to_string(), "choi_2011".to_string()];
        let registry = config.registry_for(&names).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_for_rejects_unknown_name() {
        let config = Config::default();
        let names = vec!["troiano_2007".to_string(), "none".to_string()];
        assert!(matches!(
            config.registry_for(&names),
            Err(Error::Config(ConfigError::UnknownAlgorithm { .. }))
        ));
    }

    #[test]
    fn test_load_if_exists_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_if_exists(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.epoch.length_secs, 60);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("absent.toml"));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::ReadFile { .. }))
        ));
    }
}
