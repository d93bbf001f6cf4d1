//! Interactive setup wizard.
//!
//! Walks through epoch length, algorithm selection, evaluation resolution,
//! and the output directory, then writes a config file built from the
//! default template.

use std::fs;
use std::path::PathBuf;

use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::app::Config;
use crate::cli::{output, paths};
use crate::domain::algorithm::ALGORITHM_NAMES;
use crate::error::{ConfigError, Result};

/// Default config template used by the setup wizard.
const CONFIG_TEMPLATE: &str = include_str!("../../config.toml.example");

/// Run the interactive setup wizard.
pub fn execute(path: PathBuf, force: bool) -> Result<()> {
    if output::is_json() {
        return Err(ConfigError::InvalidValue {
            field: "json",
            reason: "`wearwolf init` is interactive; use `wearwolf config init` for scripted setup"
                .to_string(),
        }
        .into());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    println!();
    output::note("Welcome to wearwolf. Let's get you set up.");
    println!();

    let theme = ColorfulTheme::default();

    // ─────────────────────────────────────────────────────────────────────────
    // Epochs
    // ─────────────────────────────────────────────────────────────────────────

    output::section("Epochs");

    let epoch_length: u32 = Input::with_theme(&theme)
        .with_prompt("Epoch length in seconds (count exports are usually 60)")
        .default(60)
        .interact()?;

    // ─────────────────────────────────────────────────────────────────────────
    // Algorithms
    // ─────────────────────────────────────────────────────────────────────────

    output::section("Algorithms");

    let prompts = [
        ("hecht_2009", "hecht_2009: 5min zero-VMU runs"),
        ("troiano_2007", "troiano_2007: 60min zero counts (NHANES)"),
        ("choi_2011", "choi_2011: 90min zero counts, validated spikes"),
        ("hees_2013", "hees_2013: still axes on raw samples"),
    ];

    let mut enabled_algorithms = Vec::new();
    for (name, prompt) in prompts {
        let enable = Confirm::with_theme(&theme)
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        if enable {
            enabled_algorithms.push(name);
        }
    }

    if enabled_algorithms.is_empty() {
        output::warning("No algorithms selected.");
        let proceed = Confirm::with_theme(&theme)
            .with_prompt("Continue anyway?")
            .default(false)
            .interact()?;
        if !proceed {
            output::note("Setup aborted.");
            return Ok(());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Comparison
    // ─────────────────────────────────────────────────────────────────────────

    output::section("Comparison");

    let resolution: u32 = Input::with_theme(&theme)
        .with_prompt("Evaluation grid in seconds")
        .default(60)
        .interact()?;

    // ─────────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────────

    output::section("Output");

    let output_dir: String = Input::with_theme(&theme)
        .with_prompt("Directory for exported CSVs")
        .default(".".to_string())
        .interact()?;

    // ─────────────────────────────────────────────────────────────────────────
    // Generate & Write Config
    // ─────────────────────────────────────────────────────────────────────────

    println!();
    let spinner = output::spinner("Writing configuration...");

    if path.exists() && !force {
        output::spinner_fail(&spinner, "Config already exists");
        let overwrite = Confirm::with_theme(&theme)
            .with_prompt(format!("{} already exists. Overwrite?", path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            output::note("Setup aborted.");
            return Ok(());
        }
    }

    let config = generate_config(epoch_length, &enabled_algorithms, resolution, &output_dir)?;

    // The wizard must not write a config the loader would reject.
    Config::parse_toml(&config, &path)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &config)?;

    output::spinner_success(&spinner, "Configuration saved");

    // ─────────────────────────────────────────────────────────────────────────
    // Summary
    // ─────────────────────────────────────────────────────────────────────────

    output::section("Ready");

    output::success(&format!("Config      {}", path.display()));
    output::field("Epochs", format!("{epoch_length}s"));
    output::field(
        "Algorithms",
        if enabled_algorithms.is_empty() {
            "(none)".to_string()
        } else {
            enabled_algorithms.join(", ")
        },
    );
    output::field("Grid", format!("{resolution}s"));
    output::field("Output", &output_dir);

    println!();
    output::section("Next Steps");

    output::note(&format!(
        "1. Detect:  {}",
        output::highlight("wearwolf detect <recording>")
    ));
    output::note(&format!(
        "2. Score:   {}",
        output::highlight("wearwolf compare <recording> -r <annotations.csv>")
    ));
    output::note(&format!(
        "3. Review:  {}",
        output::highlight("wearwolf config show")
    ));

    Ok(())
}

fn generate_config(
    epoch_length: u32,
    algorithms: &[&str],
    resolution: u32,
    output_dir: &str,
) -> Result<String> {
    let mut config: toml::Value =
        toml::from_str(CONFIG_TEMPLATE).map_err(|source| ConfigError::Parse {
            path: "config.toml.example".to_string(),
            content: CONFIG_TEMPLATE.to_string(),
            source,
        })?;
    let table = config.as_table_mut().ok_or_else(|| ConfigError::InvalidValue {
        field: "config",
        reason: "config template root must be a TOML table".to_string(),
    })?;

    if let Some(epoch_table) = table.get_mut("epoch").and_then(toml::Value::as_table_mut) {
        epoch_table.insert(
            "length_secs".to_string(),
            toml::Value::Integer(i64::from(epoch_length)),
        );
    }

    if let Some(algorithms_table) = table
        .get_mut("algorithms")
        .and_then(toml::Value::as_table_mut)
    {
        algorithms_table.insert(
            "enabled".to_string(),
            toml::Value::Array(
                algorithms
                    .iter()
                    .map(|name| toml::Value::String((*name).to_string()))
                    .collect(),
            ),
        );
    }

    if let Some(compare_table) = table.get_mut("compare").and_then(toml::Value::as_table_mut) {
        compare_table.insert(
            "resolution_secs".to_string(),
            toml::Value::Integer(i64::from(resolution)),
        );
    }

    if let Some(output_table) = table.get_mut("output").and_then(toml::Value::as_table_mut) {
        output_table.insert(
            "directory".to_string(),
            toml::Value::String(output_dir.to_string()),
        );
    }

    toml::to_string_pretty(&config).map_err(|error| {
        ConfigError::InvalidValue {
            field: "config",
            reason: error.to_string(),
        }
        .into()
    })
}
