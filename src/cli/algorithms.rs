//! Algorithm listing and explanation.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::domain::algorithm::{
    Choi2011Config, Hecht2009Config, Hees2013Config, Troiano2007Config, ALGORITHM_NAMES,
};
use crate::error::Result;

#[derive(Tabled)]
struct AlgorithmRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Input")]
    input: &'static str,
    #[tabled(rename = "Window")]
    window: &'static str,
    #[tabled(rename = "Detects")]
    detects: &'static str,
}

fn algorithm_rows() -> Vec<AlgorithmRow> {
    vec![
        AlgorithmRow {
            name: "hecht_2009",
            input: "epochs",
            window: "5min",
            detects: "runs of zero vector magnitude",
        },
        AlgorithmRow {
            name: "troiano_2007",
            input: "epochs",
            window: "60min",
            detects: "zero counts, short spikes tolerated",
        },
        AlgorithmRow {
            name: "choi_2011",
            input: "epochs",
            window: "90min",
            detects: "zero counts with spike validation",
        },
        AlgorithmRow {
            name: "hees_2013",
            input: "raw",
            window: "60min",
            detects: "still axes by std and range",
        },
    ]
}

/// List available detection algorithms.
pub fn execute_list() -> Result<()> {
    if output::is_json() {
        let rows: Vec<_> = algorithm_rows()
            .iter()
            .map(|row| {
                json!({
                    "name": row.name,
                    "input": row.input,
                    "window": row.window,
                    "detects": row.detects,
                })
            })
            .collect();
        output::json_output(json!({ "algorithms": rows }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Available algorithms");
    println!();

    let table = Table::new(algorithm_rows()).to_string();
    for line in table.lines() {
        println!("  {}", line);
    }

    println!();
    println!(
        "  Run {} for details",
        output::highlight("wearwolf algorithms explain <name>")
    );
    println!();

    Ok(())
}

/// Explain a specific algorithm.
pub fn execute_explain(name: &str) -> Result<()> {
    output::header(env!("CARGO_PKG_VERSION"));

    match name {
        "hecht_2009" => explain_hecht_2009(),
        "troiano_2007" => explain_troiano_2007(),
        "choi_2011" => explain_choi_2011(),
        "hees_2013" => explain_hees_2013(),
        _ => {
            output::error(&format!("Unknown algorithm: {}", name));
            println!();
            println!("  Available: {}", ALGORITHM_NAMES.join(", "));
            return Ok(());
        }
    }

    Ok(())
}

fn explain_hecht_2009() {
    let defaults = Hecht2009Config::default();

    output::section("hecht_2009");
    println!();
    println!("  Marks every run of consecutive zero-VMU minutes as non-wear.");
    println!("  The shortest window of the four algorithms, so it is the most");
    println!("  eager to call brief still periods non-wear.");
    println!();
    println!("  Requires: 60s epoch counts");
    println!();
    println!("  Configuration:");
    println!("    [algorithms.hecht_2009]");
    println!(
        "    vmu_threshold = {:.1}       # VMU at or below this is a zero",
        defaults.vmu_threshold
    );
    println!(
        "    min_period_minutes = {}    # shortest run scored as non-wear",
        defaults.min_period_minutes
    );
    println!();
    println!("  Hecht et al., COPD 6(2), 2009.");
    println!();
}

fn explain_troiano_2007() {
    let defaults = Troiano2007Config::default();

    output::section("troiano_2007");
    println!();
    println!("  Marks runs of at least 60 zero-count minutes as non-wear,");
    println!("  tolerating up to 2 minutes of low counts inside the run. Any");
    println!("  count at or above the stop level ends the run immediately.");
    println!("  This is the algorithm behind the NHANES analyses.");
    println!();
    println!("  Requires: 60s epoch counts");
    println!();
    println!("  Configuration:");
    println!("    [algorithms.troiano_2007]");
    println!(
        "    activity_threshold = {:.1}     # counts at or below this are zero",
        defaults.activity_threshold
    );
    println!(
        "    min_period_minutes = {}     # shortest run scored as non-wear",
        defaults.min_period_minutes
    );
    println!(
        "    spike_tolerance_minutes = {} # nonzero minutes allowed inside a run",
        defaults.spike_tolerance_minutes
    );
    println!(
        "    spike_stoplevel = {:.1}      # counts at or above this end the run",
        defaults.spike_stoplevel
    );
    println!(
        "    use_vector_magnitude = {} # score VMU instead of axis 1",
        defaults.use_vector_magnitude
    );
    println!();
    println!("  Troiano et al., Med Sci Sports Exerc 40(1), 2008.");
    println!();
}

fn explain_choi_2011() {
    let defaults = Choi2011Config::default();

    output::section("choi_2011");
    println!();
    println!("  Extends troiano_2007 with a 90-minute window and a validation");
    println!("  step: a nonzero spike inside a candidate run only survives when");
    println!("  the 30 minutes upstream and downstream of it are free of counts.");
    println!();
    println!("  Requires: 60s epoch counts");
    println!();
    println!("  Configuration:");
    println!("    [algorithms.choi_2011]");
    println!(
        "    activity_threshold = {:.1}     # counts at or below this are zero",
        defaults.activity_threshold
    );
    println!(
        "    min_period_minutes = {}     # shortest run scored as non-wear",
        defaults.min_period_minutes
    );
    println!(
        "    spike_tolerance_minutes = {} # consecutive nonzero minutes allowed",
        defaults.spike_tolerance_minutes
    );
    println!(
        "    min_window_minutes = {}     # still minutes required around a spike",
        defaults.min_window_minutes
    );
    println!(
        "    use_vector_magnitude = {} # score VMU instead of axis 1",
        defaults.use_vector_magnitude
    );
    println!();
    println!("  Choi et al., Med Sci Sports Exerc 43(2), 2011.");
    println!();
}

fn explain_hees_2013() {
    let defaults = Hees2013Config::default();

    output::section("hees_2013");
    println!();
    println!("  The only detector that works on raw samples instead of epoch");
    println!("  counts. Slides a 60-minute window in 15-minute steps and marks");
    println!("  the window non-wear when enough axes are still, judged by the");
    println!("  per-axis standard deviation and value range.");
    println!();
    println!("  Requires: raw acceleration samples");
    println!();
    println!("  Configuration:");
    println!("    [algorithms.hees_2013]");
    println!(
        "    window_minutes = {}       # sliding window length",
        defaults.window_minutes
    );
    println!(
        "    step_minutes = {}         # step between windows",
        defaults.step_minutes
    );
    println!(
        "    std_threshold_mg = {:.1}   # axis is still below this std",
        defaults.std_threshold_mg
    );
    println!(
        "    range_threshold_mg = {:.1} # axis is still below this range",
        defaults.range_threshold_mg
    );
    println!(
        "    min_axes = {}             # still axes needed to call non-wear",
        defaults.min_axes
    );
    println!();
    println!("  van Hees et al., PLoS One 8(4), 2013.");
    println!();
}
