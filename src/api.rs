//! Convenience entry points.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::config::ReadOptions;
use crate::error::Result;
use crate::sink::{CsvSink, RowSink};
use crate::xpt::parser::{Document, Parser};

/// Decodes a transport stream, emitting rows into `sink`.
///
/// Returns the library metadata accumulated during the parse.
///
/// # Errors
///
/// Returns the first fatal decoding error; see [`crate::Error`].
pub fn convert<R: Read, S: RowSink + ?Sized>(
    input: R,
    sink: &mut S,
    options: &ReadOptions,
) -> Result<Document> {
    Parser::new(sink, options.clone()).run(input)
}

/// Decodes a transport file to CSV, path to path.
///
/// `None` for either path means standard input or standard output.
///
/// # Errors
///
/// Returns an error if either file cannot be opened or decoding fails.
pub fn convert_path(
    input: Option<&Path>,
    output: Option<&Path>,
    options: &ReadOptions,
) -> Result<Document> {
    let reader: Box<dyn Read> = match input {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    let mut sink = CsvSink::new(writer);
    let document = convert(reader, &mut sink, options)?;
    sink.finish()?;
    Ok(document)
}
