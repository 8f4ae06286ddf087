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

//! Draw all GPX tracks below a directory onto one interactive HTML map.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use gpx_track_convert::pipeline::{convert_map, prepare_map};
use gpx_track_convert::scan::find_gpx_files;
use gpx_track_convert::{InputKind, MapOptions};
use gpx_track_convert_cli::{init_tracing, resolve_input, NO_INPUT};

#[derive(Parser, Debug)]
#[command(author, version, about = "Draw every GPX track below a directory onto one HTML map", long_about = None)]
struct Cli {
    /// Directory searched recursively for .gpx files
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    input: Option<PathBuf>,

    /// Output name; <name>.html is written inside the input directory
    #[arg(short, long)]
    output: Option<String>,

    /// Also write the tracks as <name>.kml
    #[arg(long, action = ArgAction::SetTrue)]
    kml: bool,

    /// Do not open the map in the default viewer
    #[arg(long, action = ArgAction::SetTrue)]
    no_open: bool,

    /// Verbose logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Conversion failed with: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(input) = resolve_input(cli.input, cli.output, InputKind::Directory)? else {
        println!("{NO_INPUT}");
        return Ok(());
    };
    let paths = prepare_map(&input)?;

    println!("Stored Input Path: {}", input.input_path.display());
    println!("Stored Output Path: {}", paths.html.display());

    let files = find_gpx_files(&input.input_path)?;
    println!("{} GPX Files Found", files.len());

    let options = MapOptions {
        write_kml: cli.kml,
        open_viewer: !cli.no_open,
    };
    let report = convert_map(&input, &files, paths, &options)
        .with_context(|| format!("converting {}", input.input_path.display()))?;

    println!("Conversion Successful: {}", report.paths.html.display());
    Ok(())
}
