//! Handler for the `detect` command.

use chrono::Duration;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::app::export;
use crate::cli::command::DetectArgs;
use crate::cli::{config as config_cmd, output};
use crate::domain::algorithm::Detection;
use crate::error::Result;
use crate::reader;

/// Split a `--algorithms a,b,c` value into names.
pub(crate) fn parse_algorithm_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Tabled)]
struct IntervalTableRow {
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Duration")]
    duration: String,
}

/// Execute `detect`: run algorithms on one recording and print intervals.
pub fn execute(args: &DetectArgs) -> Result<()> {
    let config = config_cmd::resolve_config(&args.config)?;
    config.logging.init();

    let registry = match &args.algorithms {
        Some(list) => config.registry_for(&parse_algorithm_list(list))?,
        None => config.registry()?,
    };

    let spinner = output::spinner(&format!("Reading {}", args.input.display()));
    let recording = reader::read_recording(&args.input);
    match &recording {
        Ok(_) => output::spinner_success(&spinner, "Read recording"),
        Err(_) => output::spinner_fail(&spinner, "Read failed"),
    }
    let recording = recording?;
    let ctx = recording.context();

    // Explicit selection means every named algorithm must run; without one
    // the applicable subset is enough.
    let detections = if args.algorithms.is_some() {
        registry.detect_required(&ctx)?
    } else {
        registry.detect_all(&ctx)?
    };

    if let Some(path) = &args.export {
        let rows = export::interval_rows(&file_label(args), &detections);
        export::write_intervals(path, &rows)?;
    }

    if output::is_json() {
        let payload: Vec<_> = detections.iter().map(detection_json).collect();
        output::json_output(json!({
            "file": file_label(args),
            "detections": payload,
            "export": args.export.as_ref().map(|p| p.display().to_string()),
        }));
        return Ok(());
    }

    if detections.is_empty() {
        output::warning("no enabled algorithm applies to this input");
        return Ok(());
    }

    for detection in &detections {
        print_detection(detection);
    }

    if let Some(path) = &args.export {
        println!();
        output::success(&format!("Wrote intervals to {}", path.display()));
    }

    Ok(())
}

fn file_label(args: &DetectArgs) -> String {
    args.input
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| args.input.display().to_string())
}

fn detection_json(detection: &Detection) -> serde_json::Value {
    let series = &detection.series;
    let intervals: Vec<_> = series
        .non_wear_intervals()
        .iter()
        .map(|interval| {
            json!({
                "start": interval.start().format("%Y-%m-%dT%H:%M:%S").to_string(),
                "end": interval.end().format("%Y-%m-%dT%H:%M:%S").to_string(),
                "duration_secs": interval.duration().num_seconds(),
            })
        })
        .collect();
    json!({
        "algorithm": detection.algorithm,
        "grid": series.resolution().to_string(),
        "non_wear_fraction": series.non_wear_fraction(),
        "intervals": intervals,
    })
}

fn print_detection(detection: &Detection) {
    let series = &detection.series;
    let intervals = series.non_wear_intervals();

    output::section(detection.algorithm);
    output::field("Grid", series.resolution());
    output::field(
        "Non-wear",
        format!(
            "{} ({:.1}%)",
            format_duration(series.total_non_wear()),
            series.non_wear_fraction() * 100.0
        ),
    );

    if intervals.is_empty() {
        output::note("no non-wear detected");
        return;
    }

    let rows: Vec<IntervalTableRow> = intervals
        .iter()
        .map(|interval| IntervalTableRow {
            start: interval.start().format("%Y-%m-%d %H:%M").to_string(),
            end: interval.end().format("%Y-%m-%d %H:%M").to_string(),
            duration: format_duration(interval.duration()),
        })
        .collect();

    println!();
    let table = Table::new(rows).to_string();
    for line in table.lines() {
        println!("  {}", line);
    }
}

fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{total}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::command::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::Path;

    fn parse_detect(argv: &[&str]) -> DetectArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Detect(args) => args,
            _ => panic!("expected detect command"),
        }
    }

    /// One hour of wear, 95 still minutes, another hour of wear.
    fn write_epoch_fixture(path: &Path) {
        let mut lines = vec!["timestamp,axis1,axis2,axis3".to_string()];
        let start = chrono::NaiveDate::from_ymd_opt(2017, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        for i in 0..215 {
            let stamp = start + Duration::minutes(i);
            let counts = if (60..155).contains(&i) { 0 } else { 300 + i };
            lines.push(format!(
                "{},{},{},{}",
                stamp.format("%Y-%m-%d %H:%M:%S"),
                counts,
                counts,
                counts
            ));
        }
        fs::write(path, lines.join("\n")).unwrap();
    }

    // Tests for algorithm list parsing

    #[test]
    fn test_parse_algorithm_list_trims_and_drops_empty() {
        assert_eq!(
            parse_algorithm_list(" choi_2011 , hees_2013 ,"),
            vec!["choi_2011".to_string(), "hees_2013".to_string()]
        );
        assert!(parse_algorithm_list("").is_empty());
    }

    // Tests for duration formatting

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(Duration::minutes(95)), "1h 35m");
        assert_eq!(format_duration(Duration::minutes(5)), "5m");
        assert_eq!(format_duration(Duration::seconds(30)), "30s");
    }

    // Tests for execute

    #[test]
    fn test_execute_detects_still_block() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("day1.csv");
        write_epoch_fixture(&input);
        let export = temp_dir.path().join("intervals.csv");

        let args = parse_detect(&[
            "wearwolf",
            "detect",
            input.to_str().unwrap(),
            "-a",
            "choi_2011",
            "-e",
            export.to_str().unwrap(),
        ]);
        execute(&args).unwrap();

        let written = fs::read_to_string(&export).unwrap();
        assert!(written.starts_with("file,algorithm,start,end,duration_secs"));
        assert!(written.contains("day1.csv,choi_2011,2017-06-01T09:00:00"));
    }

    #[test]
    fn test_execute_runs_applicable_subset_without_selection() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("day1.csv");
        write_epoch_fixture(&input);

        let args = parse_detect(&["wearwolf", "detect", input.to_str().unwrap()]);
        // hees_2013 is enabled but needs raw data; without an explicit
        // selection it is skipped rather than failing the run.
        execute(&args).unwrap();
    }

    #[test]
    fn test_execute_explicit_inapplicable_algorithm_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("day1.csv");
        write_epoch_fixture(&input);

        let args = parse_detect(&[
            "wearwolf",
            "detect",
            input.to_str().unwrap(),
            "-a",
            "hees_2013",
        ]);
        let error = execute(&args).unwrap_err();
        assert!(error.to_string().contains("raw"));
    }

    #[test]
    fn test_execute_unknown_algorithm_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("day1.csv");
        write_epoch_fixture(&input);

        let args = parse_detect(&[
            "wearwolf",
            "detect",
            input.to_str().unwrap(),
            "-a",
            "mcfadden_1998",
        ]);
        assert!(execute(&args).is_err());
    }
}
