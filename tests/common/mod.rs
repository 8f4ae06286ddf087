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

//! GPX fixtures shared by the pipeline tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// A track point as `(time, latitude, longitude, speed in m/s)`.
pub type Sample<'a> = (&'a str, f64, f64, f64);

/// GPX 1.1 document with one speed-annotated track.
pub fn speed_gpx(samples: &[Sample]) -> String {
    let points: String = samples
        .iter()
        .map(|(time, lat, lon, speed)| {
            format!(
                r#"
      <trkpt lat="{lat}" lon="{lon}">
        <time>{time}</time>
        <extensions><speed>{speed}</speed></extensions>
      </trkpt>"#
            )
        })
        .collect();
    wrap_track(&points)
}

/// GPX 1.1 document with one track of plain positions.
pub fn position_gpx(coords: &[(f64, f64)]) -> String {
    let points: String = coords
        .iter()
        .map(|(lat, lon)| format!(r#"<trkpt lat="{lat}" lon="{lon}"></trkpt>"#))
        .collect();
    wrap_track(&points)
}

/// GPX 1.1 document without any track.
pub fn empty_gpx() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1" creator="test">
  <metadata><name>nothing recorded</name></metadata>
</gpx>
"#
    .to_string()
}

fn wrap_track(points: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1" creator="test">
  <trk>
    <trkseg>{points}
    </trkseg>
  </trk>
</gpx>
"#
    )
}

/// Write `content` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// `var tracks = [...]` payload of a rendered map.
pub fn map_tracks(html: &str) -> serde_json::Value {
    let line = html
        .lines()
        .find_map(|l| l.trim().strip_prefix("var tracks = "))
        .expect("map has no tracks");
    serde_json::from_str(line.trim_end_matches(';')).unwrap()
}
