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

//! Recursive discovery of GPX files.

use std::collections::HashSet;
use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{io_error, Error};

/// Maximum directory nesting followed below the scanned root.
const MAX_RECURSION_DEPTH: usize = 100;
/// Suffix identifying GPX files; matched case-sensitively.
const GPX_SUFFIX: &str = ".gpx";

/// Recursively find all GPX files below `dir`.
///
/// The result is sorted by path so that repeated runs draw the tracks in the
/// same order on every platform. Directories reached twice through symlinks
/// are scanned once. An empty result is [`Error::NoGpxFiles`].
pub fn find_gpx_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut visited = HashSet::new();
    let mut files = Vec::new();
    collect_gpx_files(dir, &mut visited, 0, &mut files)?;

    if files.is_empty() {
        return Err(Error::NoGpxFiles(dir.to_path_buf()));
    }
    files.sort();
    debug!(dir = %dir.display(), files = files.len(), "scanned for GPX files");
    Ok(files)
}

fn collect_gpx_files(
    dir: &Path,
    visited: &mut HashSet<PathBuf>,
    depth: usize,
    files: &mut Vec<PathBuf>,
) -> Result<(), Error> {
    if depth > MAX_RECURSION_DEPTH {
        warn!(dir = %dir.display(), "maximum directory depth exceeded, not descending");
        return Ok(());
    }
    let entries = match read_unvisited(dir, visited) {
        Ok(Some(entries)) => entries,
        Ok(None) => return Ok(()),
        // Only the scanned root itself must be readable.
        Err(source) if depth > 0 => {
            warn!(dir = %dir.display(), error = %source, "skipping unreadable directory");
            return Ok(());
        }
        Err(source) => return Err(io_error(dir)(source)),
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(source) => {
                warn!(dir = %dir.display(), error = %source, "skipping unreadable entry");
                continue;
            }
        };
        if path.is_dir() {
            collect_gpx_files(&path, visited, depth + 1, files)?;
        } else if is_gpx_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// List `dir` unless its canonical path has been scanned already.
fn read_unvisited(dir: &Path, visited: &mut HashSet<PathBuf>) -> io::Result<Option<ReadDir>> {
    if !visited.insert(dir.canonicalize()?) {
        return Ok(None);
    }
    fs::read_dir(dir).map(Some)
}

fn is_gpx_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(GPX_SUFFIX))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn finds_nested_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("2024/may")).unwrap();
        fs::write(root.join("b.gpx"), "").unwrap();
        fs::write(root.join("a.gpx"), "").unwrap();
        fs::write(root.join("2024/may/run.gpx"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("upper.GPX"), "").unwrap();
        fs::write(root.join("track.gpx.bak"), "").unwrap();

        let files = find_gpx_files(root).unwrap();

        assert_eq!(
            files,
            vec![
                root.join("2024/may/run.gpx"),
                root.join("a.gpx"),
                root.join("b.gpx"),
            ]
        );
    }

    #[test]
    fn directory_named_like_gpx_is_descended() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("export.gpx")).unwrap();
        fs::write(root.join("export.gpx/inner.gpx"), "").unwrap();

        let files = find_gpx_files(root).unwrap();

        assert_eq!(files, vec![root.join("export.gpx/inner.gpx")]);
    }

    #[test]
    fn no_files_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), "").unwrap();

        let err = find_gpx_files(dir.path()).unwrap_err();

        assert!(matches!(err, Error::NoGpxFiles(p) if p == dir.path()));
    }

    #[test]
    fn unreadable_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let err = find_gpx_files(&missing).unwrap_err();

        assert!(matches!(err, Error::Io { path, .. } if path == missing));
    }

    #[test]
    fn unreadable_subdirectory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut visited = HashSet::new();
        let mut files = vec![];

        collect_gpx_files(&dir.path().join("gone"), &mut visited, 1, &mut files).unwrap();

        assert!(files.is_empty());
        assert!(visited.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn locked_subdirectory_does_not_hide_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let private = root.join("private");
        fs::create_dir(&private).unwrap();
        fs::write(private.join("hidden.gpx"), "").unwrap();
        fs::write(root.join("open.gpx"), "").unwrap();
        fs::set_permissions(&private, fs::Permissions::from_mode(0o000)).unwrap();
        let readable = fs::read_dir(&private).is_ok();

        let files = find_gpx_files(root);

        fs::set_permissions(&private, fs::Permissions::from_mode(0o755)).unwrap();
        let files = files.unwrap();
        if readable {
            // Permissions do not apply to a privileged user.
            assert_eq!(files, vec![root.join("open.gpx"), private.join("hidden.gpx")]);
        } else {
            assert_eq!(files, vec![root.join("open.gpx")]);
        }
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycles_are_scanned_once() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/one.gpx"), "").unwrap();
        std::os::unix::fs::symlink(root, root.join("sub/loop")).unwrap();

        let files = find_gpx_files(root).unwrap();

        assert_eq!(files, vec![root.join("sub/one.gpx")]);
    }
}
