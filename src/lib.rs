//! Wearwolf - Non-wear detection for body-worn sensor recordings.
//!
//! This crate reads accelerometer recordings (GT3X archives, EDF files,
//! ActiLife and plain CSV exports), runs published non-wear detection
//! algorithms over them, and scores the detections against reference
//! annotations such as hand-scored ECG wear logs.
//!
//! # Architecture
//!
//! Detection uses an algorithm trait behind a registry:
//!
//! - **`domain::algorithm`** - Pluggable non-wear algorithms
//!   - `Hecht2009Algorithm` - 5 min zero-VMU runs on epoch counts
//!   - `Troiano2007Algorithm` - 60 min zero counts with tolerated spikes (NHANES)
//!   - `Choi2011Algorithm` - 90 min zero counts with spike window validation
//!   - `Hees2013Algorithm` - per-axis stillness on raw acceleration
//!
//! - **`reader`** - Format detection and parsing for recording files
//! - **`app`** - Configuration, bounded batch execution, CSV exports
//!
//! # Modules
//!
//! - [`domain`] - Recording and wear-series types, agreement metrics
//! - [`domain::algorithm`] - Algorithm trait, registry, and implementations
//! - [`reader`] - GT3X, EDF, CSV recording readers and annotation files
//! - [`app`] - Config loading from TOML, batch runner, exports
//! - [`cli`] - The `wearwolf` command surface
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Builders for synthetic recordings with known ground truth
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use wearwolf::app::Config;
//! use wearwolf::reader;
//!
//! # fn main() -> wearwolf::error::Result<()> {
//! let config = Config::default();
//! let recording = reader::read_recording(Path::new("day1.csv"))?;
//! let detections = config.registry()?.detect_all(&recording.context())?;
//! for detection in &detections {
//!     println!(
//!         "{}: {:.1}% non-wear",
//!         detection.algorithm,
//!         detection.series.non_wear_fraction() * 100.0
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod reader;

#[cfg(feature = "testkit")]
pub mod testkit;
