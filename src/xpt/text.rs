//! Character data decoding.
//!
//! Transport files declare no encoding. The default policy assumes UTF-8 and
//! demotes the whole document to Latin-1 the first time a field fails to
//! decode; the failing field is re-decoded under Latin-1 and every later
//! field stays there. SAS also escapes non-ASCII characters as
//! `(*ESC*){unicode HHHH}` in some exports; those are unescaped after
//! decoding.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::config::TextMode;
use crate::error::{Error, Result};

static UNICODE_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\*ESC\*\)\{unicode ([0-9a-fA-F]+)\}").unwrap()
});

/// Stateful text decoder shared by one document.
#[derive(Debug)]
pub struct TextDecoder {
    mode: TextMode,
}

impl TextDecoder {
    /// Creates a decoder in the given mode.
    #[must_use]
    pub fn new(mode: TextMode) -> Self {
        Self { mode }
    }

    /// The current mode (observable after a Latin-1 promotion).
    #[must_use]
    pub fn mode(&self) -> TextMode {
        self.mode
    }

    /// Decodes a field, trimming trailing NUL and space bytes first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] in [`TextMode::StrictUtf8`] when the bytes
    /// are not valid UTF-8.
    pub fn decode_trimmed(&mut self, bytes: &[u8]) -> Result<String> {
        let trimmed = trim_padding(bytes);
        match self.mode {
            TextMode::Utf8Latin1 => match std::str::from_utf8(trimmed) {
                Ok(s) => Ok(s.to_owned()),
                Err(_) => {
                    warn!("character data is not UTF-8, switching document to Latin-1");
                    self.mode = TextMode::Latin1;
                    Ok(latin1(trimmed))
                }
            },
            TextMode::StrictUtf8 => std::str::from_utf8(trimmed)
                .map(str::to_owned)
                .map_err(|e| Error::encoding(e.to_string())),
            TextMode::Latin1 => Ok(latin1(trimmed)),
        }
    }
}

/// Replaces `(*ESC*){unicode HHHH}` sequences with their code points.
///
/// Escapes naming invalid code points are left verbatim.
#[must_use]
pub fn unescape_unicode(s: &str) -> String {
    if !s.contains("(*ESC*)") {
        return s.to_owned();
    }
    UNICODE_ESCAPE
        .replace_all(s, |caps: &Captures<'_>| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned()
}

fn trim_padding(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && (bytes[end - 1] == 0 || bytes[end - 1] == b' ') {
        end -= 1;
    }
    &bytes[..end]
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_nul_and_space() {
        let mut d = TextDecoder::new(TextMode::Utf8Latin1);
        assert_eq!(d.decode_trimmed(b"\0\0\0\0\0    ").unwrap(), "");
        assert_eq!(d.decode_trimmed(b"AGE  \0\0 ").unwrap(), "AGE");
    }

    #[test]
    fn test_latin1_promotion_sticks() {
        let mut d = TextDecoder::new(TextMode::Utf8Latin1);
        // 0xE9 is 'é' in Latin-1 but not valid UTF-8 on its own.
        assert_eq!(d.decode_trimmed(&[0xE9]).unwrap(), "é");
        assert_eq!(d.mode(), TextMode::Latin1);
        // Later fields decode as Latin-1 without complaint.
        assert_eq!(d.decode_trimmed(&[0xC3, 0xA9]).unwrap(), "Ã©");
    }

    #[test]
    fn test_strict_mode_errors() {
        let mut d = TextDecoder::new(TextMode::StrictUtf8);
        assert!(d.decode_trimmed(&[0xE9]).is_err());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(
            unescape_unicode("ABC 3(*ESC*){unicode 03BC}g"),
            "ABC 3\u{03BC}g"
        );
        assert_eq!(unescape_unicode("plain"), "plain");
        // Surrogate range is not a valid scalar; the escape stays.
        assert_eq!(
            unescape_unicode("(*ESC*){unicode D800}"),
            "(*ESC*){unicode D800}"
        );
    }
}
