//! Time axis of the model output.

use crate::{OceanError, OceanResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered timestamps matching the time axis of a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    times: Vec<NaiveDateTime>,
}

impl Timeline {
    pub fn new(times: Vec<NaiveDateTime>) -> Self {
        Self { times }
    }

    /// Daily timeline starting at `start`.
    pub fn daily(start: NaiveDate, days: usize) -> Self {
        let times = start
            .iter_days()
            .take(days)
            .filter_map(|day| day.and_hms_opt(0, 0, 0))
            .collect();
        Self { times }
    }

    /// Parse one ISO-8601 date or datetime per line. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn parse(text: &str) -> OceanResult<Self> {
        let mut times = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parsed = parse_timestamp(line).ok_or_else(|| OceanError::DateParse {
                line: number + 1,
                value: line.to_string(),
            })?;
            times.push(parsed);
        }
        Ok(Self { times })
    }

    pub fn from_file(path: impl AsRef<Path>) -> OceanResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NaiveDateTime> {
        self.times.get(index).copied()
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Keep the timestamps at indices `0, n, 2n, ...`.
    pub fn every_nth(&self, n: usize) -> Self {
        let step = n.max(1);
        Self {
            times: self.times.iter().step_by(step).copied().collect(),
        }
    }

    /// First timestamp of each complete averaging window of `delta_t` steps.
    ///
    /// The result has the same length as the time axis produced by
    /// averaging a field with the same window.
    pub fn window_starts(&self, delta_t: usize) -> Self {
        let step = delta_t.max(1);
        let windows = self.times.len() / step;
        Self {
            times: (0..windows).map(|w| self.times[w * step]).collect(),
        }
    }

    /// Dates formatted as `YYYY-MM-DD`, for chart labels and reports.
    pub fn labels(&self) -> Vec<String> {
        self.times
            .iter()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .collect()
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_formats() {
        let text = "# model dates\n2015-01-01\n2015-01-02T12:00:00\n\n2015-01-03 06:30:00\n";
        let timeline = Timeline::parse(text).unwrap();
        assert_eq!(timeline.len(), 3);
        assert_eq!(
            timeline.labels(),
            vec!["2015-01-01", "2015-01-02", "2015-01-03"]
        );
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = Timeline::parse("2015-01-01\nyesterday\n").unwrap_err();
        match err {
            OceanError::DateParse { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_every_nth() {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let timeline = Timeline::daily(start, 10);
        let kept = timeline.every_nth(4);
        assert_eq!(kept.labels(), vec!["2015-01-01", "2015-01-05", "2015-01-09"]);
    }

    #[test]
    fn test_window_starts_drops_partial_window() {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let timeline = Timeline::daily(start, 65);
        let windows = timeline.window_starts(30);
        assert_eq!(windows.labels(), vec!["2015-01-01", "2015-01-31"]);
    }
}
