//! Loading timelines from disk.

use ocean_common::Timeline;
use std::io::Write;

#[test]
fn test_timeline_from_file_and_windows() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for day in 1..=31 {
        writeln!(file, "2016-01-{:02}", day).unwrap();
    }
    file.flush().unwrap();

    let timeline = Timeline::from_file(file.path()).unwrap();
    assert_eq!(timeline.len(), 31);

    let windows = timeline.window_starts(10);
    assert_eq!(
        windows.labels(),
        vec!["2016-01-01", "2016-01-11", "2016-01-21"]
    );
}

#[test]
fn test_timeline_missing_file() {
    let result = Timeline::from_file("/nonexistent/datetimes.txt");
    assert!(matches!(result, Err(ocean_common::OceanError::Io(_))));
}
