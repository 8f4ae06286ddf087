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

//! Convert a GPX track into a per-minute speed/pace CSV table and chart.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use gpx_track_convert::pipeline::{convert_table, prepare_table};
use gpx_track_convert::{InputKind, TableOptions};
use gpx_track_convert_cli::{init_tracing, resolve_input, NO_INPUT};

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a GPX track into a per-minute speed CSV and chart", long_about = None)]
struct Cli {
    /// GPX file to convert
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output name; <name>.csv and <name>.png are written next to the input
    #[arg(short, long)]
    output: Option<String>,

    /// Skip rendering the speed chart
    #[arg(long, action = ArgAction::SetTrue)]
    no_plot: bool,

    /// Open the chart in the default viewer
    #[arg(long, action = ArgAction::SetTrue)]
    show: bool,

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
    let Some(input) = resolve_input(cli.input, cli.output, InputKind::GpxFile)? else {
        println!("{NO_INPUT}");
        return Ok(());
    };
    let paths = prepare_table(&input)?;

    println!("Stored Input Path: {}", input.input_path.display());
    println!("Stored Output Path: {}", paths.csv.display());

    let options = TableOptions {
        render_chart: !cli.no_plot,
        show_chart: cli.show && !cli.no_plot,
    };
    let report = convert_table(&input, paths, &options)
        .with_context(|| format!("converting {}", input.input_path.display()))?;

    println!("Conversion Successful: {}", report.paths.csv.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn missing_output_leaves_form_to_ask() {
        let cli = Cli::parse_from(["gpx2csv", "--input", "track.gpx", "--no-plot"]);

        assert_eq!(cli.input, Some(PathBuf::from("track.gpx")));
        assert_eq!(cli.output, None);
        assert!(cli.no_plot);
    }
}
