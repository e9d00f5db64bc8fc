//! Error types for xpt2csv.
//!
//! This module defines the [`Error`] enum covering every fatal condition the
//! decoder can hit. Grammar errors carry the originating record bytes so the
//! caller can see exactly which 80-byte unit broke the transport grammar.

use std::io;

use thiserror::Error;

use crate::xpt::constants::RECORD_LEN;

/// An owned copy of the 80-byte record that triggered a grammar error.
pub type BadRecord = Box<[u8; RECORD_LEN]>;

/// The main error type for decoding operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The first record is not a LIBRARY header.
    #[error("invalid library header: {}", preview(.record))]
    BadLibraryHeader {
        /// The offending record.
        record: BadRecord,
    },

    /// The library real header (or its modification-time record) is malformed.
    #[error("invalid real header: {}", preview(.record))]
    BadRealHeader {
        /// The offending record.
        record: BadRecord,
    },

    /// A member header failed to parse under both the version-8 and
    /// version-6 field layouts.
    #[error("invalid member header: {}", preview(.record))]
    BadMemberHeader {
        /// The offending record.
        record: BadRecord,
    },

    /// The member descriptor header is malformed.
    #[error("invalid member descriptor: {}", preview(.record))]
    BadDescriptor {
        /// The offending record.
        record: BadRecord,
    },

    /// The NAMESTR header is malformed.
    #[error("invalid namestr header: {}", preview(.record))]
    BadNamestrHeader {
        /// The offending record.
        record: BadRecord,
    },

    /// A 140-byte column descriptor violates the namestr layout.
    #[error("invalid namestr: {message}")]
    BadNamestr {
        /// Description of the violation.
        message: String,
        /// The offending descriptor bytes.
        data: Vec<u8>,
    },

    /// A numeric column declares an output format the decoder does not know.
    #[error("unknown numeric format: {name:?}")]
    UnknownFormat {
        /// The format name from the namestr.
        name: String,
    },

    /// Character data could not be decoded under the configured text mode.
    #[error("character decoding failed: {message}")]
    Encoding {
        /// Description of the failure.
        message: String,
    },

    /// An IBM float's exponent does not fit the 11-bit IEEE 754 field.
    #[error("IBM float exponent {exponent} overflows IEEE 754")]
    FloatOverflow {
        /// The out-of-range biased exponent.
        exponent: i32,
    },

    /// The input ended in the middle of a member.
    #[error("unexpected end of input while {state}")]
    ShortRead {
        /// The parser state at end of input.
        state: &'static str,
    },

    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a library-header error.
    #[must_use]
    pub fn bad_library_header(record: &[u8; RECORD_LEN]) -> Self {
        Self::BadLibraryHeader {
            record: Box::new(*record),
        }
    }

    /// Create a real-header error.
    #[must_use]
    pub fn bad_real_header(record: &[u8; RECORD_LEN]) -> Self {
        Self::BadRealHeader {
            record: Box::new(*record),
        }
    }

    /// Create a member-header error.
    #[must_use]
    pub fn bad_member_header(record: &[u8; RECORD_LEN]) -> Self {
        Self::BadMemberHeader {
            record: Box::new(*record),
        }
    }

    /// Create a member-descriptor error.
    #[must_use]
    pub fn bad_descriptor(record: &[u8; RECORD_LEN]) -> Self {
        Self::BadDescriptor {
            record: Box::new(*record),
        }
    }

    /// Create a namestr-header error.
    #[must_use]
    pub fn bad_namestr_header(record: &[u8; RECORD_LEN]) -> Self {
        Self::BadNamestrHeader {
            record: Box::new(*record),
        }
    }

    /// Create a namestr error.
    #[must_use]
    pub fn bad_namestr(message: impl Into<String>, data: &[u8]) -> Self {
        Self::BadNamestr {
            message: message.into(),
            data: data.to_vec(),
        }
    }

    /// Create an encoding error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}

/// Render record bytes for error messages: lossy text, trailing pad trimmed.
fn preview(record: &[u8; RECORD_LEN]) -> String {
    let text = String::from_utf8_lossy(record);
    format!("{:?}", text.trim_end_matches(['\0', ' ']))
}

/// Result type for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_carries_record() {
        let mut record = [b' '; RECORD_LEN];
        record[..6].copy_from_slice(b"BROKEN");
        let err = Error::bad_library_header(&record);
        assert!(err.to_string().contains("BROKEN"));

        match err {
            Error::BadLibraryHeader { record: r } => assert_eq!(&r[..6], b"BROKEN"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_preview_trims_padding() {
        let mut record = [b' '; RECORD_LEN];
        record[..5].copy_from_slice(b"SAS \0");
        assert_eq!(preview(&record), "\"SAS\"");
    }
}
