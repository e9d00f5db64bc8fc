//! Row sinks.
//!
//! The parser emits rows through the [`RowSink`] trait; [`CsvSink`] is the
//! standard implementation. Null fields stand for SAS missing values and
//! come out as empty CSV fields; quoting is the `csv` crate's concern.

use std::io::{self, Write};

use crate::error::{Error, Result};

/// A consumer of decoded rows.
pub trait RowSink {
    /// Writes one row. `None` fields are missing values.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    fn write_row(&mut self, fields: &[Option<String>]) -> Result<()>;
}

/// Writes rows as CSV.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Creates a CSV sink over any writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    /// Flushes buffered output and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the flush fails.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        self.writer.into_inner().map_err(|e| Error::Io(e.into_error()))
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_row(&mut self, fields: &[Option<String>]) -> Result<()> {
        self.writer
            .write_record(fields.iter().map(|f| f.as_deref().unwrap_or("")))
            .map_err(|e| Error::Io(io::Error::other(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nulls_are_empty_fields() {
        let mut sink = CsvSink::new(Vec::new());
        sink.write_row(&[Some("a".into()), None, Some("c".into())])
            .unwrap();
        let out = sink.finish().unwrap();
        assert_eq!(out, b"a,,c\n");
    }

    #[test]
    fn test_quoting_is_delegated() {
        let mut sink = CsvSink::new(Vec::new());
        sink.write_row(&[Some("x,y".into()), Some("plain".into())])
            .unwrap();
        let out = sink.finish().unwrap();
        assert_eq!(out, b"\"x,y\",plain\n");
    }
}
