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

//! Gathering and validating the input path and output name of a run.
//!
//! Values come from an [`InputProvider`]: either the command line
//! ([`ArgsInput`]) or an interactive form ([`PromptInput`]). Output paths are
//! always derived from the input path and the output name.

use std::io::{BufRead, Write};
use std::path::{is_separator, Path, PathBuf};

use crate::Error;

/// Title printed above the interactive form.
const FORM_TITLE: &str = "GPX File Converter";
/// Extension a table pipeline input must carry.
const GPX_EXTENSION: &str = "gpx";

/// Input path and output name of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInput {
    pub input_path: PathBuf,
    pub output_name: String,
}

impl RunInput {
    pub fn new(input_path: impl Into<PathBuf>, output_name: impl Into<String>) -> Self {
        RunInput {
            input_path: input_path.into(),
            output_name: output_name.into(),
        }
    }
}

/// What kind of input path a pipeline expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A single `.gpx` file.
    GpxFile,
    /// A directory searched for `.gpx` files.
    Directory,
}

impl InputKind {
    fn hint(self) -> &'static str {
        match self {
            InputKind::GpxFile => "GPX file",
            InputKind::Directory => "directory",
        }
    }
}

/// Source of the values of a [`RunInput`].
pub trait InputProvider {
    /// Gather the run input; `None` means the user gave none.
    fn provide(&mut self) -> Result<Option<RunInput>, Error>;
}

/// Values given on the command line.
#[derive(Debug, Clone)]
pub struct ArgsInput {
    input: RunInput,
}

impl ArgsInput {
    pub fn new(input_path: impl Into<PathBuf>, output_name: impl Into<String>) -> Self {
        ArgsInput {
            input: RunInput::new(input_path, output_name),
        }
    }
}

impl InputProvider for ArgsInput {
    fn provide(&mut self) -> Result<Option<RunInput>, Error> {
        Ok(Some(self.input.clone()))
    }
}

/// Blocking form asking for both values on a terminal.
///
/// An empty input path or the end of `reader` cancels the form.
pub struct PromptInput<R, W> {
    reader: R,
    writer: W,
    kind: InputKind,
}

impl<R: BufRead, W: Write> PromptInput<R, W> {
    pub fn new(reader: R, writer: W, kind: InputKind) -> Self {
        PromptInput {
            reader,
            writer,
            kind,
        }
    }

    /// Print `label` and read one trimmed answer; `None` at end of input.
    fn ask(&mut self, label: &str) -> Result<Option<String>, Error> {
        write!(self.writer, "{label}: ").map_err(Error::Stream)?;
        self.writer.flush().map_err(Error::Stream)?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).map_err(Error::Stream)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> InputProvider for PromptInput<R, W> {
    fn provide(&mut self) -> Result<Option<RunInput>, Error> {
        writeln!(self.writer, "{FORM_TITLE}").map_err(Error::Stream)?;
        writeln!(self.writer, "{}", "=".repeat(FORM_TITLE.len())).map_err(Error::Stream)?;

        let label = format!("Input Path ({})", self.kind.hint());
        let input_path = match self.ask(&label)? {
            Some(path) if !path.is_empty() => path,
            _ => return Ok(None),
        };
        let Some(output_name) = self.ask("Output Name")? else {
            return Ok(None);
        };

        Ok(Some(RunInput::new(input_path, output_name)))
    }
}

/// Check the input of the table pipeline: an existing `.gpx` file.
pub fn validate_table_input(input: &RunInput) -> Result<(), Error> {
    let path = &input.input_path;
    if !path.is_file() {
        return Err(Error::InvalidInputPath(path.clone()));
    }
    if path.extension().and_then(|e| e.to_str()) != Some(GPX_EXTENSION) {
        return Err(Error::InvalidFileType(path.clone()));
    }
    validate_output_name(&input.output_name)
}

/// Check the input of the map pipeline: an existing directory.
pub fn validate_map_input(input: &RunInput) -> Result<(), Error> {
    if !input.input_path.is_dir() {
        return Err(Error::InvalidInputPath(input.input_path.clone()));
    }
    validate_output_name(&input.output_name)
}

fn validate_output_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() || name.chars().any(is_separator) {
        return Err(Error::InvalidOutputName(name.to_string()));
    }
    Ok(())
}

/// Output files of the table pipeline, next to the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    pub csv: PathBuf,
    pub chart: PathBuf,
}

impl TablePaths {
    pub fn derive(input: &RunInput) -> Self {
        let dir = input.input_path.parent().unwrap_or(Path::new(""));
        TablePaths {
            csv: output_path(dir, &input.output_name, "csv"),
            chart: output_path(dir, &input.output_name, "png"),
        }
    }
}

/// Output files of the map pipeline, inside the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPaths {
    pub html: PathBuf,
    pub kml: PathBuf,
}

impl MapPaths {
    pub fn derive(input: &RunInput) -> Self {
        let dir = &input.input_path;
        MapPaths {
            html: output_path(dir, &input.output_name, "html"),
            kml: output_path(dir, &input.output_name, "kml"),
        }
    }
}

/// `dir/name.extension`, appending even if `name` already contains a dot.
fn output_path(dir: &Path, name: &str, extension: &str) -> PathBuf {
    dir.join(format!("{name}.{extension}"))
}
