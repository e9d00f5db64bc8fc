//! SAS timestamp handling.
//!
//! Header records carry 16-character `DDMONYY:HH:MM:SS` timestamps (for
//! example `04MAY20:14:17:00`); numeric columns carry offsets from the SAS
//! epoch, 1960-01-01T00:00:00.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// The SAS epoch date, 1960-01-01.
#[must_use]
pub fn sas_epoch_date() -> NaiveDate {
    // 1960-01-01 is a valid calendar date.
    NaiveDate::from_ymd_opt(1960, 1, 1).unwrap()
}

/// The SAS epoch instant, 1960-01-01T00:00:00.
#[must_use]
pub fn sas_epoch() -> NaiveDateTime {
    sas_epoch_date().and_hms_opt(0, 0, 0).unwrap()
}

/// Parses a `DDMONYY:HH:MM:SS` timestamp.
///
/// Two-digit years resolve against `pivot`: `yy >= pivot` maps to 19xx,
/// anything below to 20xx. With the default pivot of 69, `31DEC68` is 2068
/// and `01JAN69` is 1969.
///
/// Returns `None` if the text does not match the layout or names an invalid
/// calendar date.
#[must_use]
pub fn parse_sas_datetime(text: &str, pivot: u8) -> Option<NaiveDateTime> {
    let text = text.trim();
    let bytes = text.as_bytes();
    if !text.is_ascii()
        || bytes.len() != 16
        || bytes[7] != b':'
        || bytes[10] != b':'
        || bytes[13] != b':'
    {
        return None;
    }

    let day: u32 = text[0..2].trim_start().parse().ok()?;
    let month = month_number(&text[2..5])?;
    let yy: u8 = text[5..7].parse().ok()?;
    let hour: u32 = text[8..10].parse().ok()?;
    let minute: u32 = text[11..13].parse().ok()?;
    let second: u32 = text[14..16].parse().ok()?;

    let year = if yy >= pivot {
        1900 + i32::from(yy)
    } else {
        2000 + i32::from(yy)
    };

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Formats a timestamp in the `DDMONYY:HH:MM:SS` header layout.
#[must_use]
pub fn format_sas_datetime(dt: NaiveDateTime) -> String {
    format!(
        "{:02}{}{:02}:{:02}:{:02}:{:02}",
        dt.day(),
        MONTHS[dt.month0() as usize],
        dt.year().rem_euclid(100),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}

/// Formats a timestamp for display (`YYYY-MM-DD HH:MM:SS`).
#[must_use]
pub fn format_display(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Converts a SAS date value (days since the epoch) to a calendar date.
#[must_use]
pub fn date_from_sas_days(days: i64) -> Option<NaiveDate> {
    sas_epoch_date().checked_add_signed(TimeDelta::try_days(days)?)
}

/// Converts a SAS datetime value (seconds since the epoch) to a timestamp.
#[must_use]
pub fn datetime_from_sas_seconds(seconds: i64) -> Option<NaiveDateTime> {
    sas_epoch().checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

/// Converts a SAS time value (seconds since midnight) to a time of day.
///
/// Values outside `0..86400` wrap into the day, matching epoch arithmetic.
#[must_use]
pub fn time_from_sas_seconds(seconds: i64) -> NaiveTime {
    let s = seconds.rem_euclid(86_400) as u32;
    // In range by construction.
    NaiveTime::from_hms_opt(s / 3600, (s % 3600) / 60, s % 60).unwrap()
}

fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivot_crossover() {
        let late = parse_sas_datetime("31DEC68:23:59:59", 69).unwrap();
        assert_eq!(format_display(late), "2068-12-31 23:59:59");

        let early = parse_sas_datetime("01JAN69:00:00:00", 69).unwrap();
        assert_eq!(format_display(early), "1969-01-01 00:00:00");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert!(parse_sas_datetime("15jun24:14:30:45", 69).is_some());
        assert!(parse_sas_datetime("15JUN24:14:30:45", 69).is_some());
    }

    #[test]
    fn test_rejects_malformed_text() {
        assert!(parse_sas_datetime("", 69).is_none());
        assert!(parse_sas_datetime("15JUN24 14:30:45", 69).is_none());
        assert!(parse_sas_datetime("99XXX24:14:30:45", 69).is_none());
        assert!(parse_sas_datetime("31FEB24:00:00:00", 69).is_none());
    }

    #[test]
    fn test_format_roundtrip() {
        // Seconds-resolution values in the two-digit-year range survive a
        // format/parse round trip.
        for text in ["04MAY20:14:17:00", "29FEB04:06:00:59", "01JAN69:00:00:00"] {
            let t = parse_sas_datetime(text, 69).unwrap();
            assert_eq!(parse_sas_datetime(&format_sas_datetime(t), 69), Some(t));
        }
    }

    #[test]
    fn test_epoch_offsets() {
        assert_eq!(
            date_from_sas_days(0).unwrap().to_string(),
            "1960-01-01"
        );
        assert_eq!(
            date_from_sas_days(22039).unwrap().to_string(),
            "2020-05-04"
        );
        assert_eq!(
            format_display(datetime_from_sas_seconds(1_904_417_628).unwrap()),
            "2020-05-04 14:17:00"
        );
        assert_eq!(time_from_sas_seconds(51420).to_string(), "14:17:00");
        assert_eq!(time_from_sas_seconds(0).to_string(), "00:00:00");
    }
}
