//! Bounded-concurrency batch execution over many recordings.
//!
//! Recording parsing and detection are blocking work, so inputs run on
//! the blocking thread pool in waves of at most `jobs` tasks. A failing
//! input is collected with its error instead of aborting the batch;
//! callers decide what a partial batch means.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tracing::warn;

use crate::error::{Error, Result};

/// One failed input with the error it produced.
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// Completed values and per-input failures of one batch run.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub completed: Vec<T>,
    pub failures: Vec<BatchFailure>,
}

impl<T> BatchOutcome<T> {
    /// Number of inputs the batch started with.
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed.len() + self.failures.len()
    }
}

/// Run `task` over every input with at most `jobs` tasks in flight.
///
/// The progress bar advances once per finished input, completed or
/// failed.
pub async fn run_batch<T, F>(
    inputs: Vec<PathBuf>,
    jobs: usize,
    progress: ProgressBar,
    task: F,
) -> BatchOutcome<T>
where
    T: Send + 'static,
    F: Fn(&Path) -> Result<T> + Send + Sync + Clone + 'static,
{
    let jobs = jobs.max(1);
    let mut outcome = BatchOutcome {
        completed: Vec::new(),
        failures: Vec::new(),
    };

    for wave in inputs.chunks(jobs) {
        let tasks: Vec<_> = wave
            .iter()
            .map(|path| {
                let path = path.clone();
                let task = task.clone();
                let progress = progress.clone();
                async move {
                    let key = path.clone();
                    let result = match tokio::task::spawn_blocking(move || task(&path)).await {
                        Ok(result) => result,
                        Err(join) => Err(Error::Batch(join.to_string())),
                    };
                    progress.inc(1);
                    (key, result)
                }
            })
            .collect();

        for (path, result) in futures_util::future::join_all(tasks).await {
            match result {
                Ok(value) => outcome.completed.push(value),
                Err(error) => {
                    warn!(path = %path.display(), %error, "batch input failed");
                    outcome.failures.push(BatchFailure { path, error });
                }
            }
        }
    }

    progress.finish_and_clear();
    outcome
}
