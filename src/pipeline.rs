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

//! The two conversion pipelines.
//!
//! Both run strictly linearly: validate the input, extract track points,
//! transform them, write the artifact and verify it exists. The `prepare_*`
//! functions cover validation and path derivation so that a caller can
//! report the paths before the conversion starts.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::extract::{read_speed_points, read_track_points};
use crate::input::{validate_map_input, validate_table_input, MapPaths, RunInput, TablePaths};
use crate::map::{write_html, write_kml, TrackCollection};
use crate::scan::find_gpx_files;
use crate::series::TimeSeries;
use crate::table::{render_chart, write_csv};
use crate::verify::verify_output;
use crate::viewer::open_in_viewer;
use crate::{io_error, Error};

/// Options of the table pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Render the speed chart as PNG.
    pub render_chart: bool,
    /// Open the rendered chart in the default viewer.
    pub show_chart: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            render_chart: true,
            show_chart: false,
        }
    }
}

/// Outcome of a table pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct TableReport {
    pub paths: TablePaths,
    pub points: usize,
    pub series: TimeSeries,
    pub chart_written: bool,
}

/// Options of the map pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapOptions {
    /// Also write the tracks as KML.
    pub write_kml: bool,
    /// Open the HTML map in the default viewer.
    pub open_viewer: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        MapOptions {
            write_kml: false,
            open_viewer: true,
        }
    }
}

/// Outcome of a map pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct MapReport {
    pub paths: MapPaths,
    pub files_found: usize,
    pub tracks: TrackCollection,
    /// Files without track data that were left out.
    pub skipped: Vec<PathBuf>,
    pub kml_written: bool,
}

/// Validate a table pipeline input and derive its output paths.
pub fn prepare_table(input: &RunInput) -> Result<TablePaths, Error> {
    validate_table_input(input)?;
    Ok(TablePaths::derive(input))
}

/// Convert one GPX file into a per-minute CSV table and a chart.
pub fn run_table(input: &RunInput, options: &TableOptions) -> Result<TableReport, Error> {
    let paths = prepare_table(input)?;
    convert_table(input, paths, options)
}

/// Run the table conversion for an already prepared input.
pub fn convert_table(
    input: &RunInput,
    paths: TablePaths,
    options: &TableOptions,
) -> Result<TableReport, Error> {
    let source = &input.input_path;
    info!(input = %source.display(), "reading track");
    let points = read_speed_points(open(source)?).map_err(|e| e.in_file(source))?;
    if points.is_empty() {
        return Err(Error::NoTrackData(source.clone()));
    }

    let series = TimeSeries::from_points(&points);
    info!(points = points.len(), rows = series.len(), "aggregated to one-minute rows");

    if options.render_chart {
        render_chart(&series, &paths.chart)?;
        info!(chart = %paths.chart.display(), "chart written");
        if options.show_chart {
            open_in_viewer(&paths.chart);
        }
    }

    write_csv(&series, &paths.csv)?;
    verify_output(&paths.csv)?;
    info!(csv = %paths.csv.display(), "table written");

    Ok(TableReport {
        paths,
        points: points.len(),
        series,
        chart_written: options.render_chart,
    })
}

/// Validate a map pipeline input and derive its output paths.
pub fn prepare_map(input: &RunInput) -> Result<MapPaths, Error> {
    validate_map_input(input)?;
    Ok(MapPaths::derive(input))
}

/// Draw all GPX files below a directory onto one HTML map.
pub fn run_map(input: &RunInput, options: &MapOptions) -> Result<MapReport, Error> {
    let paths = prepare_map(input)?;
    let files = find_gpx_files(&input.input_path)?;
    convert_map(input, &files, paths, options)
}

/// Run the map conversion for already scanned `files`.
///
/// Files without track data are skipped; if every file is skipped the run
/// fails with [`Error::NoTrackData`] and nothing is written.
pub fn convert_map(
    input: &RunInput,
    files: &[PathBuf],
    paths: MapPaths,
    options: &MapOptions,
) -> Result<MapReport, Error> {
    if files.is_empty() {
        return Err(Error::NoGpxFiles(input.input_path.clone()));
    }

    let mut tracks = TrackCollection::new();
    let mut skipped = Vec::new();
    for (i, file) in files.iter().enumerate() {
        info!("[{}/{}] converting {}", i + 1, files.len(), file.display());
        let points = read_track_points(open(file)?).map_err(|e| e.in_file(file))?;
        if !tracks.push(file, &points) {
            warn!("No data available in {}", file.display());
            skipped.push(file.clone());
        }
    }
    if tracks.is_empty() {
        return Err(Error::NoTrackData(input.input_path.clone()));
    }

    write_html(&tracks, &paths.html)?;
    if options.write_kml {
        write_kml(&tracks, &paths.kml)?;
        verify_output(&paths.kml)?;
        info!(kml = %paths.kml.display(), "KML written");
    }
    verify_output(&paths.html)?;
    info!(
        html = %paths.html.display(),
        tracks = tracks.len(),
        skipped = skipped.len(),
        "map written"
    );

    if options.open_viewer {
        open_in_viewer(&paths.html);
    }

    Ok(MapReport {
        paths,
        files_found: files.len(),
        tracks,
        skipped,
        kml_written: options.write_kml,
    })
}

fn open(path: &Path) -> Result<BufReader<File>, Error> {
    File::open(path)
        .map(BufReader::new)
        .map_err(io_error(path))
}
