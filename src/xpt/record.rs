//! Record-level input for transport files.
//!
//! Everything in a transport file is framed in fixed 80-byte records;
//! [`RecordReader`] turns an arbitrary byte stream into that unit.

use std::io::{self, BufReader, ErrorKind, Read};

use tracing::debug;

use super::constants::{RECORD_LEN, Record};

/// A reader that yields 80-byte records.
///
/// A short final read (1-79 bytes) is treated as end-of-stream: producers pad
/// the file out to a record boundary, so a partial tail is stray padding, not
/// data.
pub struct RecordReader<R: Read> {
    inner: BufReader<R>,
}

impl<R: Read> RecordReader<R> {
    /// Creates a new record reader.
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
        }
    }

    /// Reads the next 80-byte record, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the underlying read fails.
    pub fn next_record(&mut self) -> io::Result<Option<Record>> {
        let mut record = [0u8; RECORD_LEN];
        let mut filled = 0;

        while filled < RECORD_LEN {
            match self.inner.read(&mut record[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        if filled < RECORD_LEN {
            debug!(bytes = filled, "short final read, treating as end of stream");
            return Ok(None);
        }
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_yields_complete_records() {
        let data = vec![0xABu8; RECORD_LEN * 2];
        let mut reader = RecordReader::new(Cursor::new(data));

        assert!(reader.next_record().unwrap().is_some());
        assert!(reader.next_record().unwrap().is_some());
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_short_tail_is_eof() {
        let data = vec![0u8; RECORD_LEN + 17];
        let mut reader = RecordReader::new(Cursor::new(data));

        assert!(reader.next_record().unwrap().is_some());
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_empty_input() {
        let mut reader = RecordReader::new(Cursor::new(Vec::new()));
        assert!(reader.next_record().unwrap().is_none());
    }
}
