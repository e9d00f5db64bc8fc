//! Configuration for decoding operations.
//!
//! [`ReadOptions`] controls text decoding, two-digit-year resolution, and the
//! compatibility switches for unusual upstream files.

/// Options for decoding an XPORT file.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Text decoding mode for character data.
    pub text_mode: TextMode,

    /// Pivot for two-digit years in `DDMONYY:HH:MM:SS` timestamps.
    ///
    /// Years `>= pivot` resolve to 19xx, years below it to 20xx. The default
    /// of 69 puts the crossover at January 1, 1969: `31DEC68` is 2068 and
    /// `01JAN69` is 1969.
    pub year_pivot: u8,

    /// Treat unrecognized numeric formats as plain numbers.
    ///
    /// By default an unknown format name on a numeric column aborts the
    /// decode. With this set, the format is ignored with a warning and the
    /// column decodes as a plain IBM float.
    pub lenient_formats: bool,

    /// Recognize the legacy byte-pattern encodings for temporal columns.
    ///
    /// Some upstream files carry DATE/TIME/DATETIME payloads whose leading
    /// byte is `0x43`/`0x44`/`0x45`/`0x48` with an integer offset packed in
    /// the bytes that follow. When set, those patterns are decoded directly;
    /// payloads that match none of them fall back to the standard IBM-float
    /// interpretation.
    pub legacy_datetime_heuristics: bool,

    /// Append `(DATE <hex>)`-style annotations to decoded temporal values.
    ///
    /// The CLI derives this from the `DEBUG_DATETIMES` environment variable.
    pub debug_datetimes: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            text_mode: TextMode::default(),
            year_pivot: 69,
            lenient_formats: false,
            legacy_datetime_heuristics: false,
            debug_datetimes: false,
        }
    }
}

impl ReadOptions {
    /// Creates new read options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates read options honoring the `DEBUG_DATETIMES` environment
    /// variable.
    #[must_use]
    pub fn from_env() -> Self {
        let debug_datetimes =
            std::env::var_os("DEBUG_DATETIMES").is_some_and(|v| !v.is_empty());
        Self {
            debug_datetimes,
            ..Self::default()
        }
    }

    /// Sets the text decoding mode.
    #[must_use]
    pub fn with_text_mode(mut self, mode: TextMode) -> Self {
        self.text_mode = mode;
        self
    }

    /// Sets the two-digit-year pivot.
    #[must_use]
    pub fn with_year_pivot(mut self, pivot: u8) -> Self {
        self.year_pivot = pivot;
        self
    }

    /// Sets whether unknown numeric formats decode as plain numbers.
    #[must_use]
    pub fn with_lenient_formats(mut self, lenient: bool) -> Self {
        self.lenient_formats = lenient;
        self
    }

    /// Sets whether the legacy temporal byte patterns are recognized.
    #[must_use]
    pub fn with_legacy_datetime_heuristics(mut self, enabled: bool) -> Self {
        self.legacy_datetime_heuristics = enabled;
        self
    }

    /// Sets whether temporal values carry debug annotations.
    #[must_use]
    pub fn with_debug_datetimes(mut self, enabled: bool) -> Self {
        self.debug_datetimes = enabled;
        self
    }
}

/// Text decoding mode for character data.
///
/// Transport files declare no encoding; character data is whatever the
/// producing session wrote. The default mode assumes UTF-8 and demotes the
/// whole document to Latin-1 on the first invalid sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// UTF-8 with a one-way fallback to Latin-1 on the first decode error.
    #[default]
    Utf8Latin1,

    /// Strict UTF-8: invalid sequences abort the decode.
    StrictUtf8,

    /// Latin-1 (ISO-8859-1): bytes map 1:1 to code points.
    Latin1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ReadOptions::default();
        assert_eq!(opts.text_mode, TextMode::Utf8Latin1);
        assert_eq!(opts.year_pivot, 69);
        assert!(!opts.lenient_formats);
        assert!(!opts.legacy_datetime_heuristics);
        assert!(!opts.debug_datetimes);
    }

    #[test]
    fn test_builder() {
        let opts = ReadOptions::new()
            .with_text_mode(TextMode::Latin1)
            .with_year_pivot(50)
            .with_lenient_formats(true)
            .with_legacy_datetime_heuristics(true);

        assert_eq!(opts.text_mode, TextMode::Latin1);
        assert_eq!(opts.year_pivot, 50);
        assert!(opts.lenient_formats);
        assert!(opts.legacy_datetime_heuristics);
    }
}
