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

//! Collecting per-file tracks and rendering them on a map.
//!
//! The HTML output is a self-contained [Leaflet](https://leafletjs.com)
//! document on OpenStreetMap tiles. The same collection can be written as
//! [KML](https://developers.google.com/kml) with one _Placemark_ per file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use kml::types::{Coord, Geometry, LineString, Placemark};
use kml::{Kml, KmlDocument, KmlVersion, KmlWriter};
use serde::Serialize;
use tracing::debug;

use crate::extract::TrackPoint;
use crate::{io_error, Error};

/// Initial zoom level of the map.
const ZOOM_START: u8 = 12;
/// Polyline styling passed to Leaflet.
const LINE_STYLE: LineStyle = LineStyle {
    color: "blue",
    weight: 2.5,
    opacity: 1.0,
};

/// This line needs to be prepended to the KML output.
const XML_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
/// Namespace attributes for the `<kml>` tag.
const NAMESPACES: &[(&str, &str)] = &[("xmlns", "http://www.opengis.net/kml/2.2")];
/// Default value for tessellating lines in KML.
const DEFAULT_TESSELLATE: bool = true;

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>GPX Tracks</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <style>html, body, #map { width: 100%; height: 100%; margin: 0; padding: 0; }</style>
</head>
<body>
    <div id="map"></div>
    <script>
        var map = L.map("map").setView(__CENTER__, __ZOOM__);
        L.tileLayer("https://tile.openstreetmap.org/{z}/{x}/{y}.png", {
            maxZoom: 19,
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
        }).addTo(map);
        var style = __STYLE__;
        var tracks = __TRACKS__;
        tracks.forEach(function (track) {
            L.polyline(track, style).addTo(map);
        });
    </script>
</body>
</html>
"#;

/// Use double precision for coordinate values.
type CoordValue = f64;

#[derive(Debug, Clone, Copy, Serialize)]
struct LineStyle {
    color: &'static str,
    weight: f64,
    opacity: f64,
}

/// The positions of one source file, drawn as one polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackLine {
    pub source: PathBuf,
    /// `[latitude, longitude]` pairs in recording order.
    pub points: Vec<[f64; 2]>,
}

impl TrackLine {
    pub fn latitudes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p[0])
    }

    pub fn longitudes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p[1])
    }

    /// File stem of the source, used as placemark name.
    fn name(&self) -> Option<String> {
        self.source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
    }
}

/// Ordered per-file tracks gathered while scanning a directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackCollection {
    lines: Vec<TrackLine>,
}

impl TrackCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the positions of `points` read from `source`.
    ///
    /// Returns `false` and adds nothing if `points` is empty.
    pub fn push(&mut self, source: impl Into<PathBuf>, points: &[TrackPoint]) -> bool {
        if points.is_empty() {
            return false;
        }
        self.lines.push(TrackLine {
            source: source.into(),
            points: points.iter().map(|p| [p.latitude, p.longitude]).collect(),
        });
        true
    }

    pub fn lines(&self) -> &[TrackLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Mean latitude and longitude over all points of all lines.
    pub fn center(&self) -> Option<(f64, f64)> {
        let count: usize = self.lines.iter().map(|l| l.points.len()).sum();
        if count == 0 {
            return None;
        }
        let lat: f64 = self.lines.iter().flat_map(TrackLine::latitudes).sum();
        let lon: f64 = self.lines.iter().flat_map(TrackLine::longitudes).sum();
        Some((lat / count as f64, lon / count as f64))
    }
}

/// Render `tracks` as a Leaflet HTML document.
///
/// `None` is returned for an empty collection since there is no center.
pub fn render_html(tracks: &TrackCollection) -> Result<Option<String>, Error> {
    let Some((lat, lon)) = tracks.center() else {
        return Ok(None);
    };
    let coordinates: Vec<&Vec<[f64; 2]>> = tracks.lines().iter().map(|l| &l.points).collect();

    let html = HTML_TEMPLATE
        .replace("__CENTER__", &serde_json::to_string(&[lat, lon])?)
        .replace("__ZOOM__", &ZOOM_START.to_string())
        .replace("__STYLE__", &serde_json::to_string(&LINE_STYLE)?)
        .replace("__TRACKS__", &serde_json::to_string(&coordinates)?);
    Ok(Some(html))
}

/// Write `tracks` as HTML map to `path`.
pub fn write_html(tracks: &TrackCollection, path: &Path) -> Result<(), Error> {
    let html = render_html(tracks)?.ok_or_else(|| {
        Error::NoTrackData(path.parent().unwrap_or(Path::new("")).to_path_buf())
    })?;
    fs::write(path, html).map_err(io_error(path))?;
    debug!(path = %path.display(), lines = tracks.len(), "map written");
    Ok(())
}

/// Write `tracks` as KML document to `path`.
pub fn write_kml(tracks: &TrackCollection, path: &Path) -> Result<(), Error> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut sink = BufWriter::new(file);
    write_kml_to(tracks, &mut sink)?;
    sink.flush().map_err(io_error(path))?;
    Ok(())
}

/// Write `tracks` as a complete KML document to `sink`.
pub fn write_kml_to(tracks: &TrackCollection, mut sink: impl Write) -> Result<(), Error> {
    let elements = tracks.lines().iter().map(track_placemark).collect();
    let document = Kml::Document {
        elements,
        attrs: Default::default(),
    };
    let namespaces = NAMESPACES
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let kml = Kml::<CoordValue>::KmlDocument(KmlDocument {
        version: KmlVersion::V22,
        attrs: namespaces,
        elements: vec![document],
    });

    writeln!(&mut sink, "{XML_HEAD}").map_err(Error::Stream)?;
    let mut writer = KmlWriter::from_writer(&mut sink);
    writer.write(&kml)?;
    writeln!(&mut sink).map_err(Error::Stream)?;

    Ok(())
}

/// Convert one track line to a KML _Placemark_ with a _LineString_.
fn track_placemark(line: &TrackLine) -> Kml<CoordValue> {
    let coords = line
        .points
        .iter()
        .map(|&[lat, lon]| Coord {
            x: lon,
            y: lat,
            z: None,
        })
        .collect();

    Kml::Placemark(Placemark {
        name: line.name(),
        geometry: Some(Geometry::LineString(LineString {
            tessellate: DEFAULT_TESSELLATE,
            coords,
            ..Default::default()
        })),
        ..Default::default()
    })
}
