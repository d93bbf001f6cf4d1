//! Handler for the `compare` command.
//!
//! Scores algorithm output against reference annotations, either for one
//! recording or for a directory of recordings paired with a directory of
//! annotation files by stem.

use std::path::{Path, PathBuf};

use serde_json::json;
use tabled::{Table, Tabled};

use crate::app::export::{self, MetricsRow};
use crate::app::runner::{self, BatchOutcome};
use crate::app::Config;
use crate::cli::command::CompareArgs;
use crate::cli::detect::parse_algorithm_list;
use crate::cli::{config as config_cmd, output};
use crate::domain::{ConfusionMatrix, DomainError, WearSeries};
use crate::error::{ConfigError, Error, Result};
use crate::reader;

/// Extensions the recordings directory is scanned for.
const RECORDING_EXTENSIONS: [&str; 3] = ["csv", "gt3x", "edf"];

/// Scores for one recording, one matrix per algorithm.
struct FileComparison {
    file: String,
    scores: Vec<(&'static str, ConfusionMatrix)>,
}

#[derive(Tabled)]
struct MetricsTableRow {
    #[tabled(rename = "Algorithm")]
    algorithm: &'static str,
    #[tabled(rename = "Accuracy")]
    accuracy: String,
    #[tabled(rename = "Precision")]
    precision: String,
    #[tabled(rename = "Recall")]
    recall: String,
    #[tabled(rename = "Specificity")]
    specificity: String,
    #[tabled(rename = "F1")]
    f1: String,
    #[tabled(rename = "Kappa")]
    kappa: String,
}

/// Execute `compare` in single or batch mode.
pub async fn execute(args: &CompareArgs) -> Result<()> {
    let config = config_cmd::resolve_config(&args.config)?;
    config.logging.init();

    let (comparisons, failed) = if let (Some(input), Some(reference)) =
        (&args.input, &args.reference)
    {
        (
            vec![compare_single(&config, args.algorithms.as_deref(), input, reference)?],
            0,
        )
    } else if let (Some(recordings_dir), Some(annotations_dir)) =
        (&args.recordings_dir, &args.annotations_dir)
    {
        compare_batch(&config, args, recordings_dir, annotations_dir).await?
    } else {
        // Unreachable through the parser; kept as a typed error.
        return Err(ConfigError::MissingField { field: "reference" }.into());
    };

    let pooled = pool_scores(&comparisons);

    if let Some(path) = &args.export {
        let mut rows = Vec::new();
        for comparison in &comparisons {
            for (algorithm, matrix) in &comparison.scores {
                rows.push(MetricsRow::new(comparison.file.clone(), *algorithm, matrix));
            }
        }
        if comparisons.len() > 1 {
            for (algorithm, matrix) in &pooled {
                rows.push(MetricsRow::new("(pooled)", *algorithm, matrix));
            }
        }
        export::write_metrics(path, &rows)?;
    }

    if output::is_json() {
        let recordings: Vec<_> = comparisons.iter().map(comparison_json).collect();
        let pooled_scores: Vec<_> = pooled
            .iter()
            .map(|(algorithm, matrix)| score_json(algorithm, matrix))
            .collect();
        output::json_output(json!({
            "resolution_secs": config.compare.resolution_secs,
            "recordings": recordings,
            "pooled": pooled_scores,
            "failed": failed,
            "export": args.export.as_ref().map(|p| p.display().to_string()),
        }));
        return Ok(());
    }

    if comparisons.iter().all(|c| c.scores.is_empty()) {
        output::warning("no enabled algorithm applies to these recordings");
    }

    // Per-recording tables are noise for large batches; show them for a
    // single recording or on request.
    let per_recording = comparisons.len() == 1 || output::verbosity() >= 1;
    if per_recording {
        for comparison in &comparisons {
            output::section(&comparison.file);
            print_metrics_table(&comparison.scores);
        }
    }

    if comparisons.len() > 1 {
        output::section("Pooled");
        output::field("Recordings", comparisons.len());
        if failed > 0 {
            output::field("Failed", failed);
        }
        print_metrics_table(&pooled);
    }

    if let Some(path) = &args.export {
        println!();
        output::success(&format!("Wrote metrics to {}", path.display()));
    }

    Ok(())
}

fn compare_single(
    config: &Config,
    selection: Option<&str>,
    input: &Path,
    reference: &Path,
) -> Result<FileComparison> {
    let spinner = output::spinner(&format!("Scoring {}", input.display()));
    let outcome = score_recording(config, selection, input, reference);
    match &outcome {
        Ok(_) => output::spinner_success(&spinner, "Scored recording"),
        Err(_) => output::spinner_fail(&spinner, "Comparison failed"),
    }
    outcome
}

async fn compare_batch(
    config: &Config,
    args: &CompareArgs,
    recordings_dir: &Path,
    annotations_dir: &Path,
) -> Result<(Vec<FileComparison>, usize)> {
    let inputs = pair_inputs(recordings_dir, annotations_dir)?;
    if inputs.is_empty() {
        return Err(Error::Batch(format!(
            "no recordings with matching annotations under {}",
            recordings_dir.display()
        )));
    }

    let jobs = args.jobs.unwrap_or_else(num_cpus::get);
    output::section("Batch Comparison");
    output::field("Recordings", inputs.len());
    output::field("Jobs", jobs);

    let bar = output::bar(inputs.len() as u64, "Comparing");
    let task_config = config.clone();
    let selection = args.algorithms.clone();
    let annotations_dir = annotations_dir.to_path_buf();
    let outcome: BatchOutcome<FileComparison> =
        runner::run_batch(inputs, jobs, bar, move |path| {
            let reference = annotation_path(&annotations_dir, path);
            score_recording(&task_config, selection.as_deref(), path, &reference)
        })
        .await;

    for failure in &outcome.failures {
        output::warning(&format!("{}: {}", failure.path.display(), failure.error));
    }
    if outcome.completed.is_empty() {
        return Err(Error::Batch(format!(
            "all {} recordings failed",
            outcome.failures.len()
        )));
    }

    // report rows stay in file-name order whatever the completion order
    let mut comparisons = outcome.completed;
    comparisons.sort_by(|a, b| a.file.cmp(&b.file));
    Ok((comparisons, outcome.failures.len()))
}

/// Detect on one recording and score every detection against its reference
/// annotations on the evaluation grid.
fn score_recording(
    config: &Config,
    selection: Option<&str>,
    input: &Path,
    reference: &Path,
) -> Result<FileComparison> {
    let recording = reader::read_recording(input)?;
    let ctx = recording.context();

    let detections = match selection {
        Some(list) => {
            let registry = config.registry_for(&parse_algorithm_list(list))?;
            registry.detect_required(&ctx)?
        }
        None => config.registry()?.detect_all(&ctx)?,
    };
    let intervals = reader::read_annotations(reference)?;

    let mut scores = Vec::new();
    for detection in &detections {
        let predicted = detection.series.resample_to(config.compare.resolution_secs)?;
        let truth = WearSeries::from_intervals(
            predicted.start(),
            predicted.resolution(),
            predicted.len(),
            &intervals,
        );
        // Annotations that never touch the recording span are a mispaired
        // file, not a recording with zero reference non-wear.
        if !intervals.is_empty() && truth.total_non_wear().is_zero() {
            return Err(DomainError::EmptyReference.into());
        }
        let matrix = ConfusionMatrix::from_series(&predicted, &truth)?;
        scores.push((detection.algorithm, matrix));
    }

    Ok(FileComparison {
        file: file_label(input),
        scores,
    })
}

/// Recordings under `recordings_dir` that have a matching annotation file,
/// sorted by name. Unmatched recordings are skipped with a warning.
fn pair_inputs(recordings_dir: &Path, annotations_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut recordings = Vec::new();
    for entry in std::fs::read_dir(recordings_dir)? {
        let path = entry?.path();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if !path.is_file() {
            continue;
        }
        if !matches!(extension.as_deref(), Some(ext) if RECORDING_EXTENSIONS.contains(&ext)) {
            continue;
        }
        recordings.push(path);
    }
    recordings.sort();

    let mut inputs = Vec::new();
    for recording in recordings {
        if annotation_path(annotations_dir, &recording).exists() {
            inputs.push(recording);
        } else {
            output::warning(&format!(
                "no annotation for {}; skipped",
                file_label(&recording)
            ));
        }
    }
    Ok(inputs)
}

/// A recording's annotation file shares its stem: `day1.gt3x` pairs with
/// `day1.csv` under the annotations directory.
fn annotation_path(annotations_dir: &Path, recording: &Path) -> PathBuf {
    let stem = recording
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    annotations_dir.join(format!("{stem}.csv"))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn pool_scores(comparisons: &[FileComparison]) -> Vec<(&'static str, ConfusionMatrix)> {
    let mut pooled: Vec<(&'static str, ConfusionMatrix)> = Vec::new();
    for comparison in comparisons {
        for &(algorithm, matrix) in &comparison.scores {
            match pooled.iter_mut().find(|(name, _)| *name == algorithm) {
                Some((_, total)) => *total += matrix,
                None => pooled.push((algorithm, matrix)),
            }
        }
    }
    pooled
}

fn print_metrics_table(scores: &[(&'static str, ConfusionMatrix)]) {
    if scores.is_empty() {
        output::note("no applicable algorithms");
        return;
    }

    let rows: Vec<MetricsTableRow> = scores
        .iter()
        .map(|&(algorithm, matrix)| MetricsTableRow {
            algorithm,
            accuracy: fmt_metric(matrix.accuracy()),
            precision: fmt_metric(matrix.precision()),
            recall: fmt_metric(matrix.recall()),
            specificity: fmt_metric(matrix.specificity()),
            f1: fmt_metric(matrix.f1()),
            kappa: fmt_metric(matrix.kappa()),
        })
        .collect();

    println!();
    let table = Table::new(rows).to_string();
    for line in table.lines() {
        println!("  {}", line);
    }
}

/// Three decimals, `-` where the metric is undefined.
fn fmt_metric(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.3}"))
        .unwrap_or_else(|| "-".to_string())
}

fn comparison_json(comparison: &FileComparison) -> serde_json::Value {
    let scores: Vec<_> = comparison
        .scores
        .iter()
        .map(|(algorithm, matrix)| score_json(algorithm, matrix))
        .collect();
    json!({ "file": comparison.file, "scores": scores })
}

fn score_json(algorithm: &str, matrix: &ConfusionMatrix) -> serde_json::Value {
    json!({
        "algorithm": algorithm,
        "true_positive": matrix.true_positive,
        "false_positive": matrix.false_positive,
        "true_negative": matrix.true_negative,
        "false_negative": matrix.false_negative,
        "accuracy": matrix.accuracy(),
        "precision": matrix.precision(),
        "recall": matrix.recall(),
        "specificity": matrix.specificity(),
        "f1": matrix.f1(),
        "kappa": matrix.kappa(),
    })
}
