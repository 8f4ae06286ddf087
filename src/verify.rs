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

//! Post-conversion output check.

use std::path::Path;

use crate::Error;

/// Confirm that the artifact at `path` was written.
pub fn verify_output(path: &Path) -> Result<(), Error> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::ConversionFailed(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "time,speed,pace\n").unwrap();

        assert!(verify_output(&path).is_ok());
    }

    #[test]
    fn missing_file_or_directory_fails() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            verify_output(&dir.path().join("out.csv")),
            Err(Error::ConversionFailed(_))
        ));
        assert!(matches!(
            verify_output(dir.path()),
            Err(Error::ConversionFailed(_))
        ));
    }
}
