//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use crate::app::Config;
use crate::cli::{output, paths};
use crate::error::{ConfigError, Result};

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../config.toml.example");

/// Load the configuration for a handler.
///
/// The default path is allowed to be absent (defaults apply); an explicit
/// `--config` path must exist.
pub fn resolve_config(path: &Path) -> Result<Config> {
    resolve_from(path, &paths::default_config())
}

fn resolve_from(path: &Path, default: &Path) -> Result<Config> {
    if path == default {
        Config::load_if_exists(path)
    } else {
        Config::load(path)
    }
}

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, CONFIG_TEMPLATE)?;
    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Edit {} with your settings", path.display()));
    output::note(&format!(
        "2. Run: wearwolf config validate -c {}",
        path.display()
    ));
    output::note("3. Run: wearwolf detect <recording>");
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = resolve_config(path)?;

    output::section("Effective Configuration");
    if path.exists() {
        output::field("Source", path.display());
    } else {
        output::field("Source", "(built-in defaults)");
    }

    output::section("Epochs");
    output::field("Length", format!("{}s", config.epoch.length_secs));

    output::section("Algorithms");
    if config.algorithms.enabled.is_empty() {
        output::note("(none enabled)");
    } else {
        for name in &config.algorithms.enabled {
            output::note(&format!("- {name}"));
        }
    }

    let hecht = &config.algorithms.hecht_2009;
    output::section("Hecht 2009");
    output::field("Zero VMU", format!("<= {}", hecht.vmu_threshold));
    output::field("Min period", format!("{}min", hecht.min_period_minutes));

    let troiano = &config.algorithms.troiano_2007;
    output::section("Troiano 2007");
    output::field("Zero count", format!("<= {}", troiano.activity_threshold));
    output::field("Min period", format!("{}min", troiano.min_period_minutes));
    output::field(
        "Spikes",
        format!(
            "{}min tolerated below {}",
            troiano.spike_tolerance_minutes, troiano.spike_stoplevel
        ),
    );
    output::field("Signal", signal_label(troiano.use_vector_magnitude));

    let choi = &config.algorithms.choi_2011;
    output::section("Choi 2011");
    output::field("Zero count", format!("<= {}", choi.activity_threshold));
    output::field("Min period", format!("{}min", choi.min_period_minutes));
    output::field(
        "Spikes",
        format!(
            "{}min inside {}min windows",
            choi.spike_tolerance_minutes, choi.min_window_minutes
        ),
    );
    output::field("Signal", signal_label(choi.use_vector_magnitude));

    let hees = &config.algorithms.hees_2013;
    output::section("van Hees 2013");
    output::field(
        "Window",
        format!("{}min every {}min", hees.window_minutes, hees.step_minutes),
    );
    output::field("Still axis", format!("std < {}mg or range < {}mg", hees.std_threshold_mg, hees.range_threshold_mg));
    output::field("Axes needed", hees.min_axes);

    output::section("Compare");
    output::field("Resolution", format!("{}s", config.compare.resolution_secs));

    output::section("Output");
    output::field("Directory", config.output.directory.display());

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);

    Ok(())
}

fn signal_label(use_vector_magnitude: bool) -> &'static str {
    if use_vector_magnitude {
        "vector magnitude"
    } else {
        "axis 1"
    }
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    output::section("Config Validation");
    output::field("Path", path.display());
    let config = Config::load(path)?;
    output::success("Config file is valid");

    let mut warnings = Vec::new();
    if config.algorithms.enabled.is_empty() {
        warnings.push("no algorithms enabled; detect will produce nothing".to_string());
    }
    if config.compare.resolution_secs % config.epoch.length_secs != 0 {
        warnings.push(format!(
            "epochs resampled to {}s cannot be rescored at {}s",
            config.epoch.length_secs, config.compare.resolution_secs
        ));
    }
    if !warnings.is_empty() {
        output::section("Warnings");
        for warning in &warnings {
            output::warning(warning);
        }
    }

    output::field("Next", format!("wearwolf config show -c {}", path.display()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp directory")
    }

    // Tests for CONFIG_TEMPLATE

    #[test]
    fn test_config_template_is_not_empty() {
        assert!(!CONFIG_TEMPLATE.is_empty());
    }

    #[test]
    fn test_config_template_is_valid_toml() {
        let result: std::result::Result<toml::Value, _> = toml::from_str(CONFIG_TEMPLATE);
        assert!(result.is_ok(), "CONFIG_TEMPLATE is not valid TOML");
    }

    #[test]
    fn test_config_template_spells_out_the_defaults() {
        let parsed = Config::parse_toml(CONFIG_TEMPLATE, Path::new("template")).unwrap();
        let defaults = Config::default();

        assert_eq!(parsed.epoch.length_secs, defaults.epoch.length_secs);
        assert_eq!(parsed.algorithms.enabled, defaults.algorithms.enabled);
        assert_eq!(
            parsed.algorithms.choi_2011.min_period_minutes,
            defaults.algorithms.choi_2011.min_period_minutes
        );
        assert_eq!(
            parsed.algorithms.hees_2013.std_threshold_mg,
            defaults.algorithms.hees_2013.std_threshold_mg
        );
        assert_eq!(parsed.compare.resolution_secs, defaults.compare.resolution_secs);
        assert_eq!(parsed.logging.level, defaults.logging.level);
    }

    // Tests for execute_init

    #[test]
    fn test_execute_init_creates_file() {
        let temp_dir = create_temp_dir();
        let config_path = temp_dir.path().join("config.toml");

        let result = execute_init(&config_path, false);
        assert!(result.is_ok());
        assert!(config_path.exists());
    }

    #[test]
    fn test_execute_init_writes_template_content() {
        let temp_dir = create_temp_dir();
        let config_path = temp_dir.path().join("config.toml");

        execute_init(&config_path, false).unwrap();
        let content = fs::read_to_string(&config_path).unwrap();
        assert_eq!(content, CONFIG_TEMPLATE);
    }

    #[test]
    fn test_execute_init_creates_parent_directories() {
        let temp_dir = create_temp_dir();
        let config_path = temp_dir
            .path()
            .join("nested")
            .join("dir")
            .join("config.toml");

        let result = execute_init(&config_path, false);
        assert!(result.is_ok());
        assert!(config_path.exists());
    }

    #[test]
    fn test_execute_init_fails_if_file_exists_without_force() {
        let temp_dir = create_temp_dir();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(&config_path, "existing content").unwrap();

        let result = execute_init(&config_path, false);
        assert!(result.is_err());

        // Verify original content is preserved
        let content = fs::read_to_string(&config_path).unwrap();
        assert_eq!(content, "existing content");
    }

    #[test]
    fn test_execute_init_overwrites_with_force() {
        let temp_dir = create_temp_dir();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(&config_path, "existing content").unwrap();

        let result = execute_init(&config_path, true);
        assert!(result.is_ok());

        let content = fs::read_to_string(&config_path).unwrap();
        assert_eq!(content, CONFIG_TEMPLATE);
    }

    #[test]
    fn test_execute_init_error_contains_force_hint() {
        let temp_dir = create_temp_dir();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(&config_path, "existing content").unwrap();

        let error = execute_init(&config_path, false).unwrap_err();
        assert!(
            error.to_string().contains("--force"),
            "Error should mention --force flag"
        );
    }

    // Tests for config resolution

    #[test]
    fn test_resolve_default_path_may_be_absent() {
        let temp_dir = create_temp_dir();
        let default = temp_dir.path().join("config.toml");

        let config = resolve_from(&default, &default).unwrap();
        assert_eq!(config.epoch.length_secs, 60);
    }

    #[test]
    fn test_resolve_explicit_path_must_exist() {
        let temp_dir = create_temp_dir();
        let explicit = temp_dir.path().join("mine.toml");
        let default = temp_dir.path().join("config.toml");

        let result = resolve_from(&explicit, &default);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_explicit_path_loads_overrides() {
        let temp_dir = create_temp_dir();
        let explicit = temp_dir.path().join("mine.toml");
        let default = temp_dir.path().join("config.toml");
        fs::write(&explicit, "[epoch]\nlength_secs = 15\n").unwrap();

        let config = resolve_from(&explicit, &default).unwrap();
        assert_eq!(config.epoch.length_secs, 15);
    }

    // Tests for execute_validate

    #[test]
    fn test_execute_validate_accepts_template() {
        let temp_dir = create_temp_dir();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, CONFIG_TEMPLATE).unwrap();

        assert!(execute_validate(&config_path).is_ok());
    }

    #[test]
    fn test_execute_validate_rejects_missing_file() {
        let temp_dir = create_temp_dir();
        let config_path = temp_dir.path().join("absent.toml");

        assert!(execute_validate(&config_path).is_err());
    }

    #[test]
    fn test_execute_validate_rejects_bad_value() {
        let temp_dir = create_temp_dir();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[epoch]\nlength_secs = 0\n").unwrap();

        assert!(execute_validate(&config_path).is_err());
    }

    #[test]
    fn test_execute_show_handles_defaults() {
        let temp_dir = create_temp_dir();
        // resolve through the real default path only when it exists; an
        // absent explicit path must fail instead
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, CONFIG_TEMPLATE).unwrap();

        assert!(execute_show(&config_path).is_ok());
    }
}
