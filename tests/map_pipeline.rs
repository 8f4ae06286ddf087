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

use std::fs;

use gpx_track_convert::{run_map, Error, MapOptions, RunInput};

mod common;

use common::{empty_gpx, map_tracks, position_gpx, write_file};

const QUIET: MapOptions = MapOptions {
    write_kml: false,
    open_viewer: false,
};

#[test]
fn one_polyline_per_file_with_data() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "b.gpx", &position_gpx(&[(10.0, 20.0), (12.0, 22.0)]));
    write_file(root, "nested/a.gpx", &position_gpx(&[(14.0, 30.0)]));

    let report = run_map(&RunInput::new(root, "map1"), &QUIET).unwrap();

    assert_eq!(report.paths.html, root.join("map1.html"));
    assert_eq!(report.files_found, 2);
    assert_eq!(report.tracks.len(), 2);
    assert_eq!(report.tracks.center(), Some((12.0, 24.0)));
    assert!(!report.kml_written);
    assert!(!root.join("map1.kml").exists());

    let html = fs::read_to_string(root.join("map1.html")).unwrap();
    let tracks = map_tracks(&html);
    assert_eq!(tracks.as_array().unwrap().len(), 2);
    // Sorted by path: "b.gpx" precedes "nested/a.gpx".
    assert_eq!(tracks[0], serde_json::json!([[10.0, 20.0], [12.0, 22.0]]));
    assert_eq!(tracks[1], serde_json::json!([[14.0, 30.0]]));
    assert!(html.contains("setView([12.0,24.0], 12)"));
}

#[test]
fn empty_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let valid = write_file(root, "valid.gpx", &position_gpx(&[(48.1, 11.5), (48.2, 11.6)]));
    let empty = write_file(root, "empty.gpx", &empty_gpx());

    let report = run_map(&RunInput::new(root, "map1"), &QUIET).unwrap();

    assert_eq!(report.files_found, 2);
    assert_eq!(report.skipped, vec![empty]);
    assert_eq!(report.tracks.len(), 1);
    assert_eq!(report.tracks.lines()[0].source, valid);

    let html = fs::read_to_string(&report.paths.html).unwrap();
    assert_eq!(map_tracks(&html).as_array().unwrap().len(), 1);
}

#[test]
fn directory_without_gpx_files_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "notes.txt", "no tracks here");

    let err = run_map(&RunInput::new(root, "map1"), &QUIET).unwrap_err();

    assert!(matches!(err, Error::NoGpxFiles(_)));
    assert_eq!(err.to_string(), format!("No GPX Files Found in {}", root.display()));
    assert!(!root.join("map1.html").exists());
}

#[test]
fn only_empty_files_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "empty.gpx", &empty_gpx());

    let err = run_map(&RunInput::new(root, "map1"), &QUIET).unwrap_err();

    assert!(matches!(err, Error::NoTrackData(p) if p == root));
    assert!(!root.join("map1.html").exists());
}

#[test]
fn kml_is_written_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "ride.gpx", &position_gpx(&[(48.858222, 2.2945), (48.86, 2.3)]));
    let options = MapOptions {
        write_kml: true,
        ..QUIET
    };

    let report = run_map(&RunInput::new(root, "map1"), &options).unwrap();

    assert!(report.kml_written);
    let kml = fs::read_to_string(root.join("map1.kml")).unwrap();
    assert_eq!(kml.matches("<Placemark").count(), 1);
    assert!(kml.contains("ride"));
}

#[test]
fn malformed_file_is_fatal_and_named() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let broken = write_file(root, "broken.gpx", "<gpx version=\"1.1\"><trk>");

    let err = run_map(&RunInput::new(root, "map1"), &QUIET).unwrap_err();

    assert!(matches!(err, Error::File { ref path, .. } if *path == broken));
}

#[test]
fn input_must_be_directory() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "track.gpx", &position_gpx(&[(1.0, 2.0)]));

    let err = run_map(&RunInput::new(&file, "map1"), &QUIET).unwrap_err();

    assert!(matches!(err, Error::InvalidInputPath(_)));
}
