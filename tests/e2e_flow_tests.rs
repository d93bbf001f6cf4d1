//! End-to-end flows from recording files through detection to export.

mod support;

use chrono::{NaiveDate, NaiveDateTime};

use wearwolf::app::{export, Config};
use wearwolf::reader::{read_annotations, read_recording};
use wearwolf::testkit::{EpochSeriesBuilder, RawRecordingBuilder};

fn ts(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2017, 6, 1)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

#[test]
fn e2e_epoch_file_detect_score_export() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("day1.csv");
    let (series, truth) = EpochSeriesBuilder::new()
        .active_minutes(45)
        .still_minutes(95)
        .active_minutes(40)
        .build_with_truth();
    support::recordings::write_plain_epochs(&input, &series);

    let recording = read_recording(&input).unwrap();
    let registry = Config::default().registry().unwrap();
    let detections = registry.detect_all(&recording.context()).unwrap();

    // hees_2013 needs raw samples, the three count algorithms all run
    let names: Vec<_> = detections.iter().map(|d| d.algorithm).collect();
    assert_eq!(names, vec!["hecht_2009", "troiano_2007", "choi_2011"]);

    // a 95-minute gap bounded by activity is unambiguous for all of them
    for detection in &detections {
        let matrix = support::scoring::against_truth(&detection.series, &truth);
        assert_eq!(matrix.true_positive, 95, "{}", detection.algorithm);
        assert_eq!(matrix.false_positive, 0, "{}", detection.algorithm);
        assert_eq!(matrix.false_negative, 0, "{}", detection.algorithm);
    }

    let exported = dir.path().join("intervals.csv");
    let rows = export::interval_rows("day1.csv", &detections);
    export::write_intervals(&exported, &rows).unwrap();

    let content = std::fs::read_to_string(&exported).unwrap();
    assert_eq!(content.lines().count(), 4);
    assert!(content.contains("day1.csv,choi_2011,2017-06-01T08:45:00,2017-06-01T10:20:00,5700"));

    // the export doubles as an annotation file
    let fed_back = read_annotations(&exported).unwrap();
    assert_eq!(fed_back.len(), 3);
    assert!(fed_back.iter().all(|&span| span == (ts(8, 45), ts(10, 20))));
}

#[test]
fn e2e_raw_file_detection_rescored_on_minute_grid() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("night.csv");
    let (recording, truth) = RawRecordingBuilder::new()
        .sample_rate(10)
        .wear_minutes(60)
        .still_minutes(90)
        .wear_minutes(30)
        .build_with_truth();
    support::recordings::write_plain_raw(&input, &recording);

    let read = read_recording(&input).unwrap();
    let registry = Config::default().registry().unwrap();
    let detections = registry.detect_all(&read.context()).unwrap();

    // raw input feeds hees_2013 alone
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].algorithm, "hees_2013");

    let minute_grid = detections[0].series.resample_to(60).unwrap();
    assert_eq!(minute_grid.len(), 180);

    let matrix = support::scoring::against_truth(&minute_grid, &truth);
    assert_eq!(matrix.true_positive, 90);
    assert_eq!(matrix.true_negative, 90);
    assert_eq!(matrix.accuracy(), Some(1.0));
}
