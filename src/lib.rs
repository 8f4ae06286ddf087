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

//! Library for converting [GPX](https://www.topografix.com/gpx.asp) tracks
//! into a per-minute speed table or an interactive map.
//!
//! Two pipelines are provided:
//!
//! - [`pipeline::run_table`] reads one GPX file, averages its speed samples
//!   into one-minute buckets and writes a CSV table plus a PNG chart.
//! - [`pipeline::run_map`] reads every GPX file below a directory and draws
//!   one polyline per file on a Leaflet map saved as HTML.
//!
//! # Example
//! ```
//! # use gpx_track_convert::{extract::read_speed_points, series::TimeSeries};
//! #
//! let source = r#"
//! <?xml version="1.0" encoding="UTF-8"?>
//! <gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1" creator="doc">
//!   <trk><trkseg>
//!     <trkpt lat="48.8582" lon="2.2945">
//!       <time>2024-05-01T07:30:10Z</time>
//!       <extensions><speed>2.5</speed></extensions>
//!     </trkpt>
//!     <trkpt lat="48.8583" lon="2.2946">
//!       <time>2024-05-01T07:30:40Z</time>
//!       <extensions><speed>3.5</speed></extensions>
//!     </trkpt>
//!   </trkseg></trk>
//! </gpx>
//! "#;
//!
//! let points = read_speed_points(source.as_bytes()).expect("parsing failed");
//! let series = TimeSeries::from_points(&points);
//!
//! assert_eq!(series.len(), 1);
//! assert_eq!(series.rows()[0].label(), "2024-05-01 07:30");
//! assert!((series.rows()[0].speed - 10.8).abs() < 1e-9);
//! ```

use std::io;
use std::path::{Path, PathBuf};

use gpx::errors::GpxError;
use thiserror::Error;

pub mod extract;
pub mod input;
pub mod map;
pub mod pipeline;
pub mod scan;
pub mod series;
pub mod table;
pub mod units;
pub mod verify;
pub mod viewer;

pub use input::{
    ArgsInput, InputKind, InputProvider, MapPaths, PromptInput, RunInput, TablePaths,
};
pub use pipeline::{run_map, run_table, MapOptions, MapReport, TableOptions, TableReport};

/// Error returned from the conversion pipelines.
#[derive(Error, Debug)]
pub enum Error {
    /// The input path does not exist or is of the wrong kind.
    #[error("Invalid Input Path: {}", .0.display())]
    InvalidInputPath(PathBuf),
    /// The input file does not carry the `.gpx` extension.
    #[error("Invalid Input File Type: {} is not a .gpx file", .0.display())]
    InvalidFileType(PathBuf),
    /// The output name is empty or contains a path separator.
    #[error("Invalid Output Name: {0:?}")]
    InvalidOutputName(String),
    /// The scanned directory contains no GPX files.
    #[error("No GPX Files Found in {}", .0.display())]
    NoGpxFiles(PathBuf),
    /// No track points were available where some are required.
    #[error("No track data available in {}", .0.display())]
    NoTrackData(PathBuf),
    /// A track point lacks a field the table pipeline needs.
    #[error("track point {index} has no {field}")]
    MissingField { index: usize, field: &'static str },
    /// A track point field could not be parsed.
    #[error("track point {index} has invalid {field} {value:?}")]
    InvalidValue {
        index: usize,
        field: &'static str,
        value: String,
    },
    /// Streaming the GPX XML failed.
    #[error("reading XML failed: {0}")]
    Xml(#[from] quick_xml::Error),
    /// GPX reading failed.
    #[error("reading GPX failed: {0}")]
    Gpx(#[from] GpxError),
    /// KML writing failed.
    #[error("writing KML failed: {0}")]
    Kml(#[from] kml::Error),
    /// CSV writing failed.
    #[error("writing CSV failed: {0}")]
    Csv(#[from] csv::Error),
    /// Serializing map data failed.
    #[error("serializing map data failed: {0}")]
    Json(#[from] serde_json::Error),
    /// The chart backend failed or panicked.
    #[error("rendering chart failed: {0}")]
    Chart(String),
    /// Reading or writing an unnamed stream failed.
    #[error("I/O error: {0}")]
    Stream(#[source] io::Error),
    /// A file system operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// An error that occurred while processing a specific source file.
    #[error("in {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
    /// The expected output artifact is missing after writing.
    #[error("Conversion Failed: {} was not written", .0.display())]
    ConversionFailed(PathBuf),
}

impl Error {
    /// Attach the source file `path` to this error.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Error::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Build a closure mapping an [`io::Error`] on `path` to [`Error::Io`].
pub(crate) fn io_error(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}
