//! # xpt2csv
//!
//! Pure Rust decoder for SAS transport files (XPORT versions 6/8/9) with CSV
//! export.
//!
//! A transport file is a sequence of 80-byte records: a library prologue,
//! one or more members (datasets) described by 140-byte column descriptors,
//! and observation data whose numerics are IBM System/360 hexadecimal
//! floats. This crate validates the record grammar, converts the numerics to
//! IEEE 754, interprets SAS DATE/TIME/DATETIME columns, and streams the
//! result into a row sink.
//!
//! ## Quick start
//!
//! ```no_run
//! use xpt2csv::{ReadOptions, convert_path};
//!
//! let doc = convert_path(
//!     Some("study.xpt".as_ref()),
//!     Some("study.csv".as_ref()),
//!     &ReadOptions::default(),
//! )?;
//! for member in &doc.members {
//!     println!("{}: {} rows", member.dataset_name, member.rows);
//! }
//! # Ok::<(), xpt2csv::Error>(())
//! ```
//!
//! Rows can also be streamed into any [`RowSink`]:
//!
//! ```no_run
//! use std::fs::File;
//! use xpt2csv::{CsvSink, ReadOptions, convert};
//!
//! let input = File::open("study.xpt")?;
//! let mut sink = CsvSink::new(Vec::new());
//! let doc = convert(input, &mut sink, &ReadOptions::default())?;
//! let csv_bytes = sink.finish()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Output shape
//!
//! Each member emits a descriptive header row
//! (`NAME (label), created <ts>, modified <ts>`), a short-names row, a
//! labels row, then one row per observation in file order. Missing values
//! come out as empty fields.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]

mod api;
pub mod config;
mod error;
pub mod sink;
pub mod xpt;

pub use api::{convert, convert_path};
pub use config::{ReadOptions, TextMode};
pub use error::{BadRecord, Error, Result};
pub use sink::{CsvSink, RowSink};
pub use xpt::XptVersion;
pub use xpt::namestr::Namestr;
pub use xpt::parser::{Document, Member, Parser};

/// Temporal conversion utilities.
///
/// These functions convert between chrono types and SAS date/time values
/// (offsets from the epoch 1960-01-01T00:00:00).
pub mod temporal {
    pub use crate::xpt::timestamp::{
        date_from_sas_days, datetime_from_sas_seconds, format_sas_datetime, parse_sas_datetime,
        sas_epoch, sas_epoch_date, time_from_sas_seconds,
    };
}
