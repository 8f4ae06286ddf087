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

//! Writing a [`TimeSeries`] as CSV table and PNG chart.

use std::fs::File;
use std::io::Write;
use std::panic;
use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::series::TimeSeries;
use crate::{io_error, Error};

/// Column names of the CSV table.
const HEADER: [&str; 3] = ["time", "speed", "pace"];
/// Chart size in pixels, a 12 by 4 figure at 300 dpi.
const CHART_SIZE: (u32, u32) = (3600, 1200);
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Write `series` as CSV to the file at `path`, replacing it if present.
pub fn write_csv(series: &TimeSeries, path: &Path) -> Result<(), Error> {
    let file = File::create(path).map_err(io_error(path))?;
    write_csv_to(series, file)
}

/// Write `series` as CSV to `sink`.
///
/// The header is `time,speed,pace`. Numbers are written in their shortest
/// round-trip form and a missing pace is an empty cell.
pub fn write_csv_to(series: &TimeSeries, sink: impl Write) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(HEADER)?;
    for row in series.rows() {
        writer.write_record([
            row.label(),
            format!("{:?}", row.speed),
            row.pace.map(|p| format!("{p:?}")).unwrap_or_default(),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Render the speed curve of `series` as PNG to `path`.
///
/// The chart is titled with the activity date. A panicking plotting backend,
/// e.g. one without usable system fonts, is reported as [`Error::Chart`].
pub fn render_chart(series: &TimeSeries, path: &Path) -> Result<(), Error> {
    let Some(date) = series.activity_date() else {
        return Err(Error::Chart("no rows to plot".to_string()));
    };
    let title = format!("{date} activity");

    let render = || {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        draw_speed_chart(root, series, &title).map_err(|e| Error::Chart(e.to_string()))
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| Error::Chart("plotting backend panicked".to_string()))??;
    debug!(path = %path.display(), "chart written");
    Ok(())
}

fn draw_speed_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    series: &TimeSeries,
    title: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let rows = series.rows();
    let Some(start) = rows.first().map(|row| row.minute) else {
        return Ok(());
    };

    let points: Vec<(f64, f64)> = rows
        .iter()
        .map(|row| (minutes_since(start, row.minute), row.speed))
        .collect();
    let x_max = points.last().map_or(0.0, |p| p.0).max(1.0);
    let y_max = points.iter().map(|p| p.1).fold(0.0, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 56))
        .margin(40)
        .x_label_area_size(110)
        .y_label_area_size(150)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Speed in km/h")
        .x_label_formatter(&|m| clock_label(start, *m))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .label_style(("sans-serif", 32))
        .axis_desc_style(("sans-serif", 40))
        .draw()?;

    chart.draw_series(LineSeries::new(points, LINE_COLOR.stroke_width(4)))?;

    root.present()?;
    Ok(())
}

fn minutes_since(start: NaiveDateTime, time: NaiveDateTime) -> f64 {
    (time - start).num_seconds() as f64 / 60.0
}

/// `HH:MM` wall clock label `minutes` after `start`.
fn clock_label(start: NaiveDateTime, minutes: f64) -> String {
    let offset = TimeDelta::seconds((minutes * 60.0).round() as i64);
    (start + offset).format("%H:%M").to_string()
}
