// Copyright 2024 Viktor Reusch
//
// This file is part of gpx_track_convert.
//
// gpx_track_convert is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// gpx_track_convert is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with gpx_track_convert. If not, see <https://www.gnu.org/licenses/>.

//! Aggregation of speed samples into one-minute buckets.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use tracing::debug;

use crate::extract::TrackPoint;
use crate::units;

/// Width of one aggregation bucket in seconds.
const BUCKET_SECONDS: i64 = 60;
/// Row label format, minute precision.
const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Activity date format used for chart titles.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Averages of one non-empty bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesRow {
    /// Start of the bucket on the wall clock of the recording.
    pub minute: NaiveDateTime,
    /// Mean speed in km/h.
    pub speed: f64,
    /// Mean pace in min/km over the moving samples, if there were any.
    pub pace: Option<f64>,
}

impl SeriesRow {
    /// `YYYY-MM-DD HH:MM` key of this row.
    pub fn label(&self) -> String {
        self.minute.format(LABEL_FORMAT).to_string()
    }
}

#[derive(Debug, Default)]
struct Bucket {
    speed_sum: f64,
    samples: usize,
    pace_sum: f64,
    moving_samples: usize,
}

impl Bucket {
    fn add(&mut self, speed_mps: f64) {
        self.speed_sum += units::kmh(speed_mps);
        self.samples += 1;
        if let Some(pace) = units::pace(speed_mps) {
            self.pace_sum += pace;
            self.moving_samples += 1;
        }
    }

    fn finish(self, minute: NaiveDateTime) -> Option<SeriesRow> {
        if self.samples == 0 {
            return None;
        }
        Some(SeriesRow {
            minute,
            speed: self.speed_sum / self.samples as f64,
            pace: (self.moving_samples > 0).then(|| self.pace_sum / self.moving_samples as f64),
        })
    }
}

/// Per-minute speed and pace of one activity, in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    rows: Vec<SeriesRow>,
}

impl TimeSeries {
    /// Bucket `points` by minute and average each bucket.
    ///
    /// Minutes are taken in the offset each timestamp was recorded in, so
    /// labels show the local time of the activity. Points lacking a timestamp
    /// or a speed do not contribute. Buckets without samples are dropped, so
    /// gaps in the recording leave no rows.
    pub fn from_points(points: &[TrackPoint]) -> Self {
        let mut buckets: BTreeMap<i64, Bucket> = BTreeMap::new();
        for (time, speed) in points.iter().filter_map(TrackPoint::sample) {
            let wall_clock = time.naive_local().and_utc();
            let key = wall_clock.timestamp().div_euclid(BUCKET_SECONDS);
            buckets.entry(key).or_default().add(speed);
        }

        let rows: Vec<SeriesRow> = buckets
            .into_iter()
            .filter_map(|(key, bucket)| {
                let minute = DateTime::from_timestamp(key * BUCKET_SECONDS, 0)?;
                bucket.finish(minute.naive_utc())
            })
            .collect();
        debug!(points = points.len(), rows = rows.len(), "aggregated time series");

        TimeSeries { rows }
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Date of the first row as `YYYY-MM-DD`.
    pub fn activity_date(&self) -> Option<String> {
        self.rows
            .first()
            .map(|row| row.minute.format(DATE_FORMAT).to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use super::*;

    fn point(h: u32, m: u32, s: u32, speed: f64) -> TrackPoint {
        TrackPoint {
            time: Some(Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap().fixed_offset()),
            latitude: 0.0,
            longitude: 0.0,
            speed: Some(speed),
        }
    }

    #[test]
    fn one_window_gives_one_mean_row() {
        let speeds = [2.0, 2.5, 3.0, 3.5];
        let points: Vec<_> = speeds
            .iter()
            .enumerate()
            .map(|(i, &v)| point(7, 30, i as u32 * 15, v))
            .collect();

        let series = TimeSeries::from_points(&points);

        assert_eq!(series.len(), 1);
        let row = series.rows()[0];
        let expected_speed = speeds.iter().map(|&v| units::kmh(v)).sum::<f64>() / 4.0;
        let expected_pace = speeds.iter().map(|&v| units::pace(v).unwrap()).sum::<f64>() / 4.0;
        assert!((row.speed - expected_speed).abs() < 1e-9);
        assert!((row.pace.unwrap() - expected_pace).abs() < 1e-9);
        assert_eq!(row.label(), "2024-05-01 07:30");
    }

    #[test]
    fn empty_minutes_are_dropped_and_rows_sorted() {
        let points = vec![
            point(7, 33, 10, 3.0),
            point(7, 30, 59, 2.0),
            point(7, 30, 0, 4.0),
        ];

        let series = TimeSeries::from_points(&points);

        let labels: Vec<_> = series.rows().iter().map(SeriesRow::label).collect();
        assert_eq!(labels, vec!["2024-05-01 07:30", "2024-05-01 07:33"]);
        assert!((series.rows()[0].speed - 10.8).abs() < 1e-9);
    }

    #[test]
    fn stationary_samples_do_not_affect_pace() {
        let points = vec![point(7, 30, 0, 0.0), point(7, 30, 30, 2.0)];

        let series = TimeSeries::from_points(&points);

        let row = series.rows()[0];
        assert!((row.speed - 3.6).abs() < 1e-9);
        assert!((row.pace.unwrap() - units::pace(2.0).unwrap()).abs() < 1e-9);
    }

    #[test]
    fn fully_stationary_bucket_has_no_pace() {
        let series = TimeSeries::from_points(&[point(7, 30, 0, 0.0), point(7, 30, 1, 0.0)]);

        assert_eq!(series.rows()[0].speed, 0.0);
        assert_eq!(series.rows()[0].pace, None);
    }

    #[test]
    fn activity_date_comes_from_first_row() {
        let points = vec![point(23, 59, 30, 1.0), point(0, 0, 30, 1.0)];

        let series = TimeSeries::from_points(&points);

        assert_eq!(series.activity_date().as_deref(), Some("2024-05-01"));
        assert_eq!(TimeSeries::default().activity_date(), None);
    }

    #[test]
    fn minutes_follow_recorded_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let mut late = point(0, 0, 0, 2.0);
        late.time = Some(plus_two.with_ymd_and_hms(2024, 5, 1, 23, 30, 10).unwrap());
        let mut early = point(0, 0, 0, 4.0);
        early.time = Some(minus_five.with_ymd_and_hms(2024, 5, 1, 23, 30, 50).unwrap());

        let series = TimeSeries::from_points(&[late, early]);

        assert_eq!(series.len(), 1);
        assert_eq!(series.rows()[0].label(), "2024-05-01 23:30");
        assert!((series.rows()[0].speed - 10.8).abs() < 1e-9);
        assert_eq!(series.activity_date().as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn points_without_samples_are_ignored() {
        let mut bare = point(7, 30, 0, 1.0);
        bare.speed = None;

        let series = TimeSeries::from_points(&[bare]);

        assert!(series.is_empty());
    }
}
