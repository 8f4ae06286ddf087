// Copyright 2023, 2024 Viktor Reusch
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

//! Shared plumbing of the `gpx2csv` and `gpx2map` command-line tools.

use std::io::{self, stdin, stdout};
use std::path::PathBuf;

use anyhow::Result;
use gpx_track_convert::{ArgsInput, InputKind, InputProvider, PromptInput, RunInput};
use tracing_subscriber::EnvFilter;

/// Message printed when the interactive form is left empty.
pub const NO_INPUT: &str = "No input path provided, exiting";

/// Log to stderr at `info`, or `debug` if `verbose`; `RUST_LOG` overrides.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Take the run input from the command line if both values are given and
/// from the interactive form otherwise.
pub fn resolve_input(
    input: Option<PathBuf>,
    output: Option<String>,
    kind: InputKind,
) -> Result<Option<RunInput>> {
    let mut provider: Box<dyn InputProvider> = match (input, output) {
        (Some(input), Some(output)) => Box::new(ArgsInput::new(input, output)),
        _ => Box::new(PromptInput::new(stdin().lock(), stdout(), kind)),
    };
    Ok(provider.provide()?)
}
