//! NAMESTR (column descriptor) decoding.
//!
//! Each variable in a member is described by a 140-byte record. All integer
//! fields are signed big-endian; character fields are space/NUL padded.
//!
//! | Offset | Width | Field    |
//! |-------:|------:|----------|
//! |      0 |     2 | ntype    |
//! |      2 |     2 | nhfun    |
//! |      4 |     2 | nlng     |
//! |      6 |     2 | nvar0    |
//! |      8 |     8 | nname    |
//! |     16 |    40 | nlabel   |
//! |     56 |     8 | nform    |
//! |     64 |     2 | nfl      |
//! |     66 |     2 | nfd      |
//! |     68 |     2 | nfj      |
//! |     70 |     2 | nfill    |
//! |     72 |     8 | niform   |
//! |     80 |     2 | nifl     |
//! |     82 |     2 | nifd     |
//! |     84 |     4 | npos     |
//! |     88 |    32 | longname |
//! |    120 |     2 | lablen   |
//! |    122 |    18 | (unused) |

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use super::constants::NAMESTR_LEN;
use super::text::TextDecoder;
use crate::error::{Error, Result};

/// A parsed column descriptor.
#[derive(Debug, Clone)]
pub struct Namestr {
    /// Variable type: 1 = numeric, 2 = character.
    pub ntype: i16,
    /// Hash of the name (always 0).
    pub nhfun: i16,
    /// Value width in the observation record.
    pub nlng: i16,
    /// Column ordinal (1-based).
    pub nvar0: i16,
    /// Short variable name (8 bytes max).
    pub nname: String,
    /// Variable label (40 bytes max).
    pub nlabel: String,
    /// Output format name.
    pub nform: String,
    /// Format width.
    pub nfl: i16,
    /// Format decimals.
    pub nfd: i16,
    /// Justification: 0 = left, 1 = right.
    pub nfj: i16,
    /// Input format name.
    pub niform: String,
    /// Informat width.
    pub nifl: i16,
    /// Informat decimals.
    pub nifd: i16,
    /// Byte offset of the value within the observation record.
    pub npos: i32,
    /// Version-8 long name (32 bytes max).
    pub longname: String,
    /// Length of the long label.
    pub lablen: i16,
}

impl Namestr {
    /// True for character columns.
    #[must_use]
    pub fn is_character(&self) -> bool {
        self.ntype == 2
    }

    /// The value width in bytes.
    #[must_use]
    pub fn length(&self) -> usize {
        self.nlng as usize
    }

    /// The byte offset within the observation record.
    #[must_use]
    pub fn position(&self) -> usize {
        self.npos as usize
    }
}

/// Unpacks one 140-byte descriptor.
///
/// # Errors
///
/// Returns [`Error::BadNamestr`] when the type, width, or position fields are
/// out of range, and propagates text-decoding errors from strict mode.
pub fn unpack_namestr(data: &[u8; NAMESTR_LEN], text: &mut TextDecoder) -> Result<Namestr> {
    let mut cursor = Cursor::new(&data[..]);

    let ntype = cursor.read_i16::<BigEndian>().map_err(Error::Io)?;
    let nhfun = cursor.read_i16::<BigEndian>().map_err(Error::Io)?;
    let nlng = cursor.read_i16::<BigEndian>().map_err(Error::Io)?;
    let nvar0 = cursor.read_i16::<BigEndian>().map_err(Error::Io)?;

    let nname = text.decode_trimmed(&data[8..16])?;
    let nlabel = text.decode_trimmed(&data[16..56])?;
    let nform = text.decode_trimmed(&data[56..64])?;

    cursor.set_position(64);
    let nfl = cursor.read_i16::<BigEndian>().map_err(Error::Io)?;
    let nfd = cursor.read_i16::<BigEndian>().map_err(Error::Io)?;
    let nfj = cursor.read_i16::<BigEndian>().map_err(Error::Io)?;

    // 70..72 is nfill, alignment only.
    let niform = text.decode_trimmed(&data[72..80])?;

    cursor.set_position(80);
    let nifl = cursor.read_i16::<BigEndian>().map_err(Error::Io)?;
    let nifd = cursor.read_i16::<BigEndian>().map_err(Error::Io)?;

    cursor.set_position(84);
    let npos = cursor.read_i32::<BigEndian>().map_err(Error::Io)?;

    let longname = text.decode_trimmed(&data[88..120])?;

    cursor.set_position(120);
    let lablen = cursor.read_i16::<BigEndian>().map_err(Error::Io)?;

    // 122..140 is irrelevant fill.

    if ntype != 1 && ntype != 2 {
        return Err(Error::bad_namestr(
            format!("variable {nname:?} has type {ntype}, expected 1 or 2"),
            data,
        ));
    }
    if nlng < 1 {
        return Err(Error::bad_namestr(
            format!("variable {nname:?} has non-positive length {nlng}"),
            data,
        ));
    }
    if npos < 0 {
        return Err(Error::bad_namestr(
            format!("variable {nname:?} has negative position {npos}"),
            data,
        ));
    }

    Ok(Namestr {
        ntype,
        nhfun,
        nlng,
        nvar0,
        nname,
        nlabel,
        nform,
        nfl,
        nfd,
        nfj,
        niform,
        nifl,
        nifd,
        npos,
        longname,
        lablen,
    })
}
