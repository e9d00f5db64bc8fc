//! The XPORT transport format decoder.
//!
//! A transport file is a sequence of 80-byte records: a library prologue,
//! then one or more members (datasets), each of which carries its own header
//! records, a block of 140-byte column descriptors (namestrs), and the
//! observation data. Modules here are layered leaves-first: [`record`] reads
//! the 80-byte units, [`ibm`] converts the numeric payloads, [`timestamp`]
//! and [`formats`] interpret temporal values, [`namestr`] decodes column
//! descriptors, and [`parser`] drives the whole grammar.

pub mod constants;
pub mod formats;
pub mod headers;
pub mod ibm;
pub mod namestr;
pub mod parser;
pub mod record;
pub mod text;
pub mod timestamp;

/// The member-header field layout in use.
///
/// Version 8/9 files use 32-character dataset names; version 6 files use
/// 8-character names with the slack left as blanks. The layout is detected
/// per document and may be corrected once after the first member header
/// parse (see [`parser`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XptVersion {
    /// Version 6 field widths.
    V6,
    /// Version 8/9 field widths (assumed until disproven).
    #[default]
    V8,
}

impl XptVersion {
    /// The version number as written in SAS documentation.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::V6 => 6,
            Self::V8 => 8,
        }
    }

    /// The other layout, for the member-header retry.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::V6 => Self::V8,
            Self::V8 => Self::V6,
        }
    }
}

impl std::fmt::Display for XptVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}
