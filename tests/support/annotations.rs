//! Reference annotation fixtures.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;

/// Write intervals as a `start,end` annotation CSV.
pub fn write_annotations(path: &Path, intervals: &[(NaiveDateTime, NaiveDateTime)]) {
    let mut content = String::from("start,end\n");
    for (start, end) in intervals {
        content.push_str(&format!(
            "{},{}\n",
            start.format("%Y-%m-%d %H:%M:%S"),
            end.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    fs::write(path, content).expect("write annotation fixture");
}

/// Write a labelled event log where only `non-wear` rows mark intervals.
pub fn write_labelled_annotations(
    path: &Path,
    rows: &[(NaiveDateTime, NaiveDateTime, &str)],
) {
    let mut content = String::from("start,end,label\n");
    for (start, end, label) in rows {
        content.push_str(&format!(
            "{},{},{label}\n",
            start.format("%Y-%m-%d %H:%M:%S"),
            end.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    fs::write(path, content).expect("write annotation fixture");
}
