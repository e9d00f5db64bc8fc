//! Transport format constants.

/// The length of a single physical record in bytes.
pub const RECORD_LEN: usize = 80;

/// NAMESTR (column descriptor) record length in bytes.
pub const NAMESTR_LEN: usize = 140;

/// Pad character (ASCII space).
pub const PAD_CHAR: u8 = 0x20;

/// One 80-byte physical record.
pub type Record = [u8; RECORD_LEN];
