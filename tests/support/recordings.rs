//! On-disk recording fixtures built from in-memory series.

use std::fs;
use std::path::Path;

use wearwolf::domain::{Axis, EpochSeries, RawRecording};

/// Write an epoch series as a plain `timestamp,axis1,axis2,axis3` CSV.
pub fn write_plain_epochs(path: &Path, series: &EpochSeries) {
    let mut content = String::from("timestamp,axis1,axis2,axis3\n");
    for (i, epoch) in series.epochs().iter().enumerate() {
        content.push_str(&format!(
            "{},{},{},{}\n",
            series.timestamp_at(i).format("%Y-%m-%d %H:%M:%S"),
            epoch.axis(Axis::X),
            epoch.axis(Axis::Y),
            epoch.axis(Axis::Z),
        ));
    }
    fs::write(path, content).expect("write epoch fixture");
}

/// Write an epoch series as an ActiLife export with the banner header.
pub fn write_actilife_epochs(path: &Path, series: &EpochSeries) {
    let mut content = banner(
        series.start(),
        series.epoch_length_secs(),
        30,
    );
    for epoch in series.epochs() {
        content.push_str(&format!("{},{},{}\n", epoch.x, epoch.y, epoch.z));
    }
    fs::write(path, content).expect("write actilife fixture");
}

/// Write a raw recording as a plain `timestamp,x,y,z` CSV.
pub fn write_plain_raw(path: &Path, recording: &RawRecording) {
    let mut content = String::from("timestamp,x,y,z\n");
    for (i, sample) in recording.samples().iter().enumerate() {
        content.push_str(&format!(
            "{},{},{},{}\n",
            recording.timestamp_at(i).format("%Y-%m-%d %H:%M:%S%.3f"),
            sample.x,
            sample.y,
            sample.z,
        ));
    }
    fs::write(path, content).expect("write raw fixture");
}

fn banner(start: chrono::NaiveDateTime, epoch_secs: u32, rate_hz: u32) -> String {
    let period = format!(
        "{:02}:{:02}:{:02}",
        epoch_secs / 3600,
        (epoch_secs % 3600) / 60,
        epoch_secs % 60
    );
    format!(
        "------------ Data File Created By ActiGraph GT3X+ ActiLife v6.11.9 \
         Firmware v2.5.0 date format M/d/yyyy at {rate_hz} Hz  Filter Normal -----------\n\
         Serial Number: NEO1F16120123\n\
         Start Time {}\n\
         Start Date {}\n\
         Epoch Period (hh:mm:ss) {period}\n\
         Download Time 09:05:00\n\
         Download Date 6/8/2017\n\
         Current Memory Address: 0\n\
         Current Battery Voltage: 4.07     Mode = 61\n\
         --------------------------------------------------\n",
        start.format("%H:%M:%S"),
        start.format("%m/%d/%Y"),
    )
}
