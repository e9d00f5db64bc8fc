//! The `HEADER RECORD` grammar.
//!
//! Every structural boundary in a transport file is announced by an 80-byte
//! header record of the form
//!
//! ```text
//! HEADER RECORD*******<TAG> HEADER RECORD!!!!!!!<payload><spaces>
//! ```
//!
//! with TAG one of `LIBRARY`/`LIBV8`, `MEMBER`/`MEMBV8`, `DSCRPTR`/`DSCPTV8`,
//! `NAMESTR`/`NAMSTV8`, `OBS`/`OBSV8`. The records between those carry
//! free-form fields at fixed offsets; the patterns here capture them. All
//! patterns run in byte mode with `.` matching any byte, since non-header
//! records may hold arbitrary binary data.

use std::sync::LazyLock;

use regex::bytes::Regex;

use super::XptVersion;
use super::constants::Record;

static LIBRARY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)^HEADER RECORD\*{7}LIB[A-Z0-9]+ HEADER RECORD!{7}0{30} *$").unwrap()
});

static REAL_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)^(.{8})(.{8})(.{8})(.{8})(.{8}) {24}(.{16})$").unwrap()
});

static MEMBER_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)^HEADER RECORD\*{7}MEM[A-Z0-9]+ +HEADER RECORD!{7}0{16}01600000000140 *$")
        .unwrap()
});

static DESCRIPTOR_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)^HEADER RECORD\*{7}DSC[A-Z0-9]+ +HEADER RECORD!{7}0{30} *$").unwrap()
});

// The member real header comes in two field layouts: version 6 has an
// 8-character dataset name and 24 blank filler bytes, version 8 spends the
// filler on a 32-character name.
static REAL_MEMBER_HEADER_6: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)^(.{8})(.{8})(.{8})(.{8})(.{8}) {24}(.{16})$").unwrap()
});

static REAL_MEMBER_HEADER_8: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)^(.{8})(.{32})(.{8})(.{8})(.{8})(.{16})$").unwrap()
});

static SECOND_MEMBER_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)^(.{16}) {16}(.{40})(.{8})$").unwrap()
});

static NAMESTR_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)^HEADER RECORD\*{7}NAM[A-Z0-9]+ +HEADER +RECORD!{7}0{6}([0-9]{6})0+ *$")
        .unwrap()
});

static OBSERVATION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)^HEADER RECORD\*{7}OBS[A-Z0-9]* +HEADER +RECORD!{7}0+ *$").unwrap()
});

/// Fields of the library real header.
#[derive(Debug)]
pub struct RealHeader {
    /// SAS version that wrote the file.
    pub sas_version: String,
    /// Operating system that wrote the file.
    pub os: String,
    /// Creation timestamp text (`DDMONYY:HH:MM:SS`).
    pub created: String,
}

/// Fields of a member real header.
#[derive(Debug)]
pub struct MemberHeader {
    /// Dataset name.
    pub dataset_name: String,
    /// SAS version that wrote the member.
    pub sas_version: String,
    /// Operating system that wrote the member.
    pub os: String,
    /// Creation timestamp text.
    pub created: String,
}

/// Fields of the second member header.
#[derive(Debug)]
pub struct SecondHeader {
    /// Modification timestamp text.
    pub modified: String,
    /// Dataset label.
    pub label: String,
    /// Dataset type.
    pub dataset_type: String,
}

/// True when the record is a LIBRARY header.
#[must_use]
pub fn is_library_header(record: &Record) -> bool {
    LIBRARY_HEADER.is_match(record)
}

/// True when the record is a MEMBER header.
#[must_use]
pub fn is_member_header(record: &Record) -> bool {
    MEMBER_HEADER.is_match(record)
}

/// True when the record is a member DESCRIPTOR header.
#[must_use]
pub fn is_descriptor_header(record: &Record) -> bool {
    DESCRIPTOR_HEADER.is_match(record)
}

/// True when the record is an OBSERVATION header.
#[must_use]
pub fn is_observation_header(record: &Record) -> bool {
    OBSERVATION_HEADER.is_match(record)
}

/// Extracts the library real header fields.
///
/// Returns `None` when the record does not match the layout or its two
/// leading symbol fields are not `SAS`.
#[must_use]
pub fn parse_real_header(record: &Record) -> Option<RealHeader> {
    let caps = REAL_HEADER.captures(record)?;
    if field(&caps, 1) != "SAS" || field(&caps, 2) != "SAS" {
        return None;
    }
    Some(RealHeader {
        sas_version: field(&caps, 4),
        os: field(&caps, 5),
        created: field(&caps, 6),
    })
}

/// Extracts a member real header under the given field layout.
///
/// Returns `None` when the record does not match or its symbol field is not
/// `SAS`; empty `sas_version`/`os` fields are returned as-is so the caller
/// can drive the version retry.
#[must_use]
pub fn parse_member_header(record: &Record, version: XptVersion) -> Option<MemberHeader> {
    let pattern: &Regex = match version {
        XptVersion::V6 => &REAL_MEMBER_HEADER_6,
        XptVersion::V8 => &REAL_MEMBER_HEADER_8,
    };
    let caps = pattern.captures(record)?;
    if field(&caps, 1) != "SAS" {
        return None;
    }
    Some(MemberHeader {
        dataset_name: field(&caps, 2),
        sas_version: field(&caps, 4),
        os: field(&caps, 5),
        created: field(&caps, 6),
    })
}

/// Extracts the second member header fields.
#[must_use]
pub fn parse_second_header(record: &Record) -> Option<SecondHeader> {
    let caps = SECOND_MEMBER_HEADER.captures(record)?;
    Some(SecondHeader {
        modified: field(&caps, 1),
        label: field(&caps, 2),
        dataset_type: field(&caps, 3),
    })
}

/// Extracts the declared descriptor count from a NAMESTR header.
///
/// The count is advisory; the actual number of descriptors comes from the
/// accumulated block length.
#[must_use]
pub fn parse_namestr_header(record: &Record) -> Option<u32> {
    let caps = NAMESTR_HEADER.captures(record)?;
    field(&caps, 1).parse().ok()
}

fn field(caps: &regex::bytes::Captures<'_>, index: usize) -> String {
    let bytes = caps.get(index).map_or(&b""[..], |m| m.as_bytes());
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\0', ' '])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xpt::constants::RECORD_LEN;

    fn record(text: &[u8]) -> Record {
        let mut r = [b' '; RECORD_LEN];
        r[..text.len()].copy_from_slice(text);
        r
    }

    #[test]
    fn test_library_header() {
        let r = record(
            b"HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!000000000000000000000000000000",
        );
        assert!(is_library_header(&r));
        assert!(!is_member_header(&r));
    }

    #[test]
    fn test_member_header() {
        let r = record(
            b"HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!000000000000000001600000000140",
        );
        assert!(is_member_header(&r));

        let v8 = record(
            b"HEADER RECORD*******MEMBV8  HEADER RECORD!!!!!!!000000000000000001600000000140",
        );
        assert!(is_member_header(&v8));
    }

    #[test]
    fn test_descriptor_header() {
        let r = record(
            b"HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!000000000000000000000000000000",
        );
        assert!(is_descriptor_header(&r));
    }

    #[test]
    fn test_observation_header() {
        let r = record(b"HEADER RECORD*******OBS     HEADER RECORD!!!!!!!000000000000000000000000000000");
        assert!(is_observation_header(&r));

        let v8 = record(b"HEADER RECORD*******OBSV8   HEADER RECORD!!!!!!!000000000000000000000000000000");
        assert!(is_observation_header(&v8));
    }

    #[test]
    fn test_namestr_header_count() {
        let r = record(
            b"HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!000000000217000000000000000000",
        );
        assert_eq!(parse_namestr_header(&r), Some(217));
    }

    #[test]
    fn test_real_header() {
        let mut r = [b' '; RECORD_LEN];
        r[0..8].copy_from_slice(b"SAS     ");
        r[8..16].copy_from_slice(b"SAS     ");
        r[16..24].copy_from_slice(b"SASLIB  ");
        r[24..32].copy_from_slice(b"9.4     ");
        r[32..40].copy_from_slice(b"Linux   ");
        r[64..80].copy_from_slice(b"04MAY20:14:17:00");

        let h = parse_real_header(&r).unwrap();
        assert_eq!(h.sas_version, "9.4");
        assert_eq!(h.os, "Linux");
        assert_eq!(h.created, "04MAY20:14:17:00");
    }

    #[test]
    fn test_real_header_rejects_non_sas() {
        let r = [b'X'; RECORD_LEN];
        assert!(parse_real_header(&r).is_none());
    }

    #[test]
    fn test_member_header_layouts() {
        // Version-8 layout: 32-character dataset name.
        let mut v8 = [b' '; RECORD_LEN];
        v8[0..8].copy_from_slice(b"SAS     ");
        v8[8..10].copy_from_slice(b"AE");
        v8[40..48].copy_from_slice(b"SASDATA ");
        v8[48..51].copy_from_slice(b"9.4");
        v8[56..61].copy_from_slice(b"Linux");
        v8[64..80].copy_from_slice(b"04MAY20:14:17:00");

        let h = parse_member_header(&v8, XptVersion::V8).unwrap();
        assert_eq!(h.dataset_name, "AE");
        assert_eq!(h.sas_version, "9.4");
        assert_eq!(h.os, "Linux");

        // The same record under the version-6 layout has the version field
        // landing in the blank filler.
        let h6 = parse_member_header(&v8, XptVersion::V6);
        assert!(h6.is_none() || h6.unwrap().sas_version.is_empty());
    }

    #[test]
    fn test_second_header() {
        let mut r = [b' '; RECORD_LEN];
        r[0..16].copy_from_slice(b"04MAY20:14:17:00");
        r[32..46].copy_from_slice(b"Adverse Events");
        r[72..76].copy_from_slice(b"DATA");

        let h = parse_second_header(&r).unwrap();
        assert_eq!(h.modified, "04MAY20:14:17:00");
        assert_eq!(h.label, "Adverse Events");
        assert_eq!(h.dataset_type, "DATA");
    }
}
