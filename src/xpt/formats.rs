//! SAS output-format decoding for numeric columns.
//!
//! A numeric column may carry a format name telling the consumer how to
//! render the stored number. The temporal formats are offsets from the SAS
//! epoch: DATE counts days since 1960-01-01, TIME counts seconds since
//! midnight, DATETIME counts seconds since the epoch.

use tracing::warn;

use super::ibm::{self, IbmValue};
use super::timestamp;
use crate::config::ReadOptions;
use crate::error::Result;

/// A recognized numeric output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Days since 1960-01-01, rendered `YYYY-MM-DD`.
    Date,
    /// Seconds since midnight, rendered `HH:MM:SS`.
    Time,
    /// Seconds since 1960-01-01T00:00:00, rendered `YYYY-MM-DD HH:MM:SS`.
    Datetime,
}

const FORMAT_TABLE: [(&str, Format); 3] = [
    ("DATE", Format::Date),
    ("TIME", Format::Time),
    ("DATETIME", Format::Datetime),
];

impl Format {
    /// Looks a format name up case-insensitively.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        FORMAT_TABLE
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, f)| f)
    }

    /// The canonical name, as used in debug annotations.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Datetime => "DATETIME",
        }
    }
}

/// Decodes one formatted numeric payload to its display text.
///
/// Missing payloads decode to `None`. With
/// [`legacy_datetime_heuristics`](ReadOptions::legacy_datetime_heuristics)
/// set, the legacy byte patterns are tried first and anything else falls
/// back to the IBM-float interpretation.
///
/// # Errors
///
/// Propagates [`crate::Error::FloatOverflow`] from the numeric codec.
pub fn decode_value(
    format: Format,
    payload: &[u8; 8],
    options: &ReadOptions,
) -> Result<Option<String>> {
    if options.legacy_datetime_heuristics
        && let Some(seconds) = legacy_offset(format, payload)
    {
        return Ok(annotate(
            render_offset(format, seconds),
            format,
            payload,
            options,
        ));
    }

    let decoded = ibm::decode_ibm(payload)?;
    if decoded.truncated {
        warn!(
            payload = %hex(payload),
            format = format.as_str(),
            "precision lost narrowing IBM mantissa"
        );
    }

    let rendered = match decoded.value {
        // Neither a missing value nor a NaN has a calendar meaning.
        IbmValue::Missing | IbmValue::Special(_) | IbmValue::Nan => None,
        IbmValue::Number(bits) => render_offset(format, f64::from_bits(bits) as i64),
    };

    Ok(annotate(rendered, format, payload, options))
}

/// Renders an epoch offset under the given format.
fn render_offset(format: Format, offset: i64) -> Option<String> {
    match format {
        Format::Date => {
            let date = timestamp::date_from_sas_days(offset)?;
            Some(date.format("%Y-%m-%d").to_string())
        }
        Format::Time => Some(timestamp::time_from_sas_seconds(offset).to_string()),
        Format::Datetime => {
            let dt = timestamp::datetime_from_sas_seconds(offset)?;
            Some(timestamp::format_display(dt))
        }
    }
}

/// The legacy byte-pattern offsets found in one documented upstream dataset:
/// a marker byte, a big-endian integer offset, and a zero tail.
fn legacy_offset(format: Format, payload: &[u8; 8]) -> Option<i64> {
    let tail_zero = |from: usize| payload[from..].iter().all(|&b| b == 0);
    match format {
        Format::Date if payload[0] == 0x44 && tail_zero(3) => {
            Some(i64::from(u16::from_be_bytes([payload[1], payload[2]])))
        }
        Format::Time if payload[0] == 0x43 && tail_zero(3) => {
            Some(i64::from(u16::from_be_bytes([payload[1], payload[2]])) >> 4)
        }
        Format::Time if payload[0] == 0x44 && tail_zero(3) => {
            Some(i64::from(u16::from_be_bytes([payload[1], payload[2]])))
        }
        Format::Time if payload[0] == 0x45 && tail_zero(4) => {
            let offset = u32::from_be_bytes([0, payload[1], payload[2], payload[3]]);
            Some(i64::from(offset >> 4))
        }
        Format::Datetime if payload[0] == 0x48 && tail_zero(5) => {
            let offset =
                u32::from_be_bytes([payload[1], payload[2], payload[3], payload[4]]);
            Some(i64::from(offset))
        }
        _ => None,
    }
}

fn annotate(
    rendered: Option<String>,
    format: Format,
    payload: &[u8; 8],
    options: &ReadOptions,
) -> Option<String> {
    let value = rendered?;
    if options.debug_datetimes {
        Some(format!("{value} ({} {})", format.as_str(), hex(payload)))
    } else {
        Some(value)
    }
}

fn hex(payload: &[u8; 8]) -> String {
    payload.iter().map(|b| format!("{b:02x}")).collect()
}
