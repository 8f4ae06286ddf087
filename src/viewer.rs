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

//! Opening results in the default viewer of the operating system.

use std::env;
use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

const NO_ARGS: &[&str] = &[];
/// The empty string is the window title expected by `start`.
const START_ARGS: &[&str] = &["/C", "start", ""];

/// Launcher program and leading arguments for operating system `os`.
fn launcher(os: &str) -> Option<(&'static str, &'static [&'static str])> {
    match os {
        "macos" => Some(("open", NO_ARGS)),
        "linux" | "freebsd" | "openbsd" | "netbsd" => Some(("xdg-open", NO_ARGS)),
        "windows" => Some(("cmd", START_ARGS)),
        _ => None,
    }
}

/// Open `path` with the default application.
///
/// Failures are logged and otherwise ignored. Returns whether the launcher
/// reported success.
pub fn open_in_viewer(path: &Path) -> bool {
    let os = env::consts::OS;
    let Some((program, args)) = launcher(os) else {
        warn!(os, "unsupported operating system, not opening {}", path.display());
        return false;
    };

    match Command::new(program).args(args).arg(path).status() {
        Ok(status) if status.success() => {
            debug!(program, path = %path.display(), "opened in viewer");
            true
        }
        Ok(status) => {
            warn!(program, %status, "error opening {}", path.display());
            false
        }
        Err(err) => {
            warn!(program, %err, "error opening {}", path.display());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launcher_per_platform() {
        assert_eq!(launcher("macos"), Some(("open", NO_ARGS)));
        assert_eq!(launcher("linux").map(|l| l.0), Some("xdg-open"));
        assert_eq!(launcher("windows").map(|l| l.1), Some(START_ARGS));
        assert_eq!(launcher("plan9"), None);
    }
}
