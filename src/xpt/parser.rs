//! The structural parser.
//!
//! A transport file is parsed by a ten-state machine consuming one 80-byte
//! record per transition:
//!
//! ```text
//! library header -> real header -> mtime header
//!   -> member header -> descriptor -> member data -> second header
//!   -> namestr header -> namestr records -> observation records
//!                                               |          |
//!                                               +- MEMBER header loops back
//! ```
//!
//! Namestr and observation payloads span record boundaries, so those two
//! states accumulate raw bytes and re-segment them by their own fixed widths
//! (140 bytes per namestr, `record_length` bytes per observation). Rows are
//! emitted to the sink as soon as one full observation is buffered.

use std::io::Read;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use super::XptVersion;
use super::constants::{NAMESTR_LEN, PAD_CHAR, Record};
use super::formats::{self, Format};
use super::headers;
use super::ibm::{self, IbmValue};
use super::namestr::{self, Namestr};
use super::record::RecordReader;
use super::text::{self, TextDecoder};
use super::timestamp;
use crate::config::ReadOptions;
use crate::error::{Error, Result};
use crate::sink::RowSink;

/// Library-level metadata accumulated over a parse.
#[derive(Debug, Default)]
pub struct Document {
    /// SAS version that wrote the file.
    pub sas_version: String,
    /// Member-header field layout in effect.
    pub real_version: XptVersion,
    /// Operating system that wrote the file.
    pub os: String,
    /// File creation timestamp.
    pub created: Option<NaiveDateTime>,
    /// File modification timestamp.
    pub modified: Option<NaiveDateTime>,
    /// The decoded members, in file order.
    pub members: Vec<Member>,
}

/// Metadata for one decoded member (dataset).
#[derive(Debug)]
pub struct Member {
    /// Dataset name.
    pub dataset_name: String,
    /// Dataset label.
    pub dataset_label: String,
    /// Dataset type.
    pub dataset_type: String,
    /// SAS version that wrote the member.
    pub sas_version: String,
    /// Operating system that wrote the member.
    pub os: String,
    /// Member creation timestamp.
    pub created: NaiveDateTime,
    /// Member modification timestamp.
    pub modified: NaiveDateTime,
    /// The column descriptors, in file order.
    pub names: Vec<Namestr>,
    /// Observation record width: last column's position plus its width.
    pub record_length: usize,
    /// Number of data rows emitted.
    pub rows: usize,
}

/// Member fields captured from the member real header.
#[derive(Debug)]
struct MemberMeta {
    dataset_name: String,
    sas_version: String,
    os: String,
    created: NaiveDateTime,
}

/// Per-column decode plan, resolved once per member.
#[derive(Debug)]
struct Column {
    name: String,
    numeric: bool,
    pos: usize,
    len: usize,
    format: Option<Format>,
}

/// A member being accumulated.
#[derive(Debug)]
struct ActiveMember {
    meta: MemberMeta,
    modified: NaiveDateTime,
    dataset_label: String,
    dataset_type: String,
    namestr_buf: Vec<u8>,
    names: Vec<Namestr>,
    columns: Vec<Column>,
    record_length: usize,
    obs_buf: Vec<u8>,
    rows: usize,
}

/// The state register. Member data rides inside the variants so the states
/// that touch it cannot exist without it.
#[derive(Debug)]
enum State {
    AwaitingLibraryHeader,
    AwaitingRealHeader,
    AwaitingMtimeHeader,
    AwaitingMemberHeader,
    AwaitingMemberDescriptor,
    AwaitingMemberData,
    AwaitingSecondHeader(MemberMeta),
    AwaitingNamestrHeader(ActiveMember),
    AwaitingNamestrRecords(ActiveMember),
    AwaitingObservationRecords(ActiveMember),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            Self::AwaitingLibraryHeader => "awaiting the library header",
            Self::AwaitingRealHeader => "awaiting the real header",
            Self::AwaitingMtimeHeader => "awaiting the modification-time header",
            Self::AwaitingMemberHeader => "awaiting a member header",
            Self::AwaitingMemberDescriptor => "awaiting the member descriptor",
            Self::AwaitingMemberData => "awaiting the member data header",
            Self::AwaitingSecondHeader(_) => "awaiting the second member header",
            Self::AwaitingNamestrHeader(_) => "awaiting the namestr header",
            Self::AwaitingNamestrRecords(_) => "awaiting namestr records",
            Self::AwaitingObservationRecords(_) => "awaiting observation records",
        }
    }
}

/// The transport-file parser. Construct with a sink, then [`Parser::run`].
pub struct Parser<'a, S: RowSink + ?Sized> {
    sink: &'a mut S,
    options: ReadOptions,
    text: TextDecoder,
    state: State,
    document: Document,
}

impl<'a, S: RowSink + ?Sized> Parser<'a, S> {
    /// Creates a parser that emits rows into `sink`.
    pub fn new(sink: &'a mut S, options: ReadOptions) -> Self {
        let text = TextDecoder::new(options.text_mode);
        Self {
            sink,
            options,
            text,
            state: State::AwaitingLibraryHeader,
            document: Document::default(),
        }
    }

    /// Decodes the whole input, emitting rows as they complete.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: a grammar violation, an unknown numeric
    /// format, a float overflow, an unexpected end of input, or I/O failure.
    pub fn run<R: Read>(mut self, input: R) -> Result<Document> {
        let mut records = RecordReader::new(input);
        while let Some(record) = records.next_record()? {
            self.step(&record)?;
        }
        self.finish()
    }

    fn step(&mut self, record: &Record) -> Result<()> {
        let state = std::mem::replace(&mut self.state, State::AwaitingLibraryHeader);
        self.state = match state {
            State::AwaitingLibraryHeader => Self::on_library_header(record)?,
            State::AwaitingRealHeader => self.on_real_header(record)?,
            State::AwaitingMtimeHeader => self.on_mtime_header(record)?,
            State::AwaitingMemberHeader => Self::on_member_header(record)?,
            State::AwaitingMemberDescriptor => Self::on_member_descriptor(record)?,
            State::AwaitingMemberData => self.on_member_data(record)?,
            State::AwaitingSecondHeader(meta) => self.on_second_header(meta, record)?,
            State::AwaitingNamestrHeader(member) => Self::on_namestr_header(member, record)?,
            State::AwaitingNamestrRecords(member) => self.on_namestr_records(member, record)?,
            State::AwaitingObservationRecords(member) => {
                self.on_observation_record(member, record)?
            }
        };
        Ok(())
    }

    fn on_library_header(record: &Record) -> Result<State> {
        if !headers::is_library_header(record) {
            return Err(Error::bad_library_header(record));
        }
        debug!("found library header");
        Ok(State::AwaitingRealHeader)
    }

    fn on_real_header(&mut self, record: &Record) -> Result<State> {
        let header =
            headers::parse_real_header(record).ok_or_else(|| Error::bad_real_header(record))?;
        if header.sas_version.is_empty() || header.os.is_empty() {
            return Err(Error::bad_real_header(record));
        }
        let created = timestamp::parse_sas_datetime(&header.created, self.options.year_pivot)
            .ok_or_else(|| Error::bad_real_header(record))?;

        self.document.sas_version = header.sas_version;
        self.document.os = header.os;
        self.document.created = Some(created);
        debug!(
            sas_version = %self.document.sas_version,
            os = %self.document.os,
            "parsed real header"
        );
        Ok(State::AwaitingMtimeHeader)
    }

    fn on_mtime_header(&mut self, record: &Record) -> Result<State> {
        let text = String::from_utf8_lossy(record);
        let modified =
            timestamp::parse_sas_datetime(text.trim_end_matches(['\0', ' ']), self.options.year_pivot)
                .ok_or_else(|| Error::bad_real_header(record))?;
        self.document.modified = Some(modified);
        Ok(State::AwaitingMemberHeader)
    }

    fn on_member_header(record: &Record) -> Result<State> {
        if !headers::is_member_header(record) {
            return Err(Error::bad_member_header(record));
        }
        Ok(State::AwaitingMemberDescriptor)
    }

    fn on_member_descriptor(record: &Record) -> Result<State> {
        if !headers::is_descriptor_header(record) {
            return Err(Error::bad_descriptor(record));
        }
        Ok(State::AwaitingMemberData)
    }

    fn on_member_data(&mut self, record: &Record) -> Result<State> {
        let meta = match self.parse_member_meta(record, self.document.real_version) {
            Some(meta) => meta,
            None => {
                // Wrong field-layout guess leaves the version or OS field
                // empty; flip the document layout and retry once.
                let flipped = self.document.real_version.flipped();
                warn!(version = %flipped, "member header did not parse, retrying");
                self.document.real_version = flipped;
                self.parse_member_meta(record, flipped)
                    .ok_or_else(|| Error::bad_member_header(record))?
            }
        };
        debug!(dataset = %meta.dataset_name, "found member");
        Ok(State::AwaitingSecondHeader(meta))
    }

    fn parse_member_meta(&self, record: &Record, version: XptVersion) -> Option<MemberMeta> {
        let header = headers::parse_member_header(record, version)?;
        if header.sas_version.is_empty() || header.os.is_empty() {
            return None;
        }
        let created = timestamp::parse_sas_datetime(&header.created, self.options.year_pivot)?;
        Some(MemberMeta {
            dataset_name: header.dataset_name,
            sas_version: header.sas_version,
            os: header.os,
            created,
        })
    }

    fn on_second_header(&mut self, meta: MemberMeta, record: &Record) -> Result<State> {
        let header =
            headers::parse_second_header(record).ok_or_else(|| Error::bad_member_header(record))?;
        let modified = timestamp::parse_sas_datetime(&header.modified, self.options.year_pivot)
            .ok_or_else(|| Error::bad_member_header(record))?;

        self.sink.write_row(&[
            Some(format!("{} ({})", meta.dataset_name, header.label)),
            Some(format!("created {}", timestamp::format_display(meta.created))),
            Some(format!("modified {}", timestamp::format_display(modified))),
        ])?;

        Ok(State::AwaitingNamestrHeader(ActiveMember {
            meta,
            modified,
            dataset_label: header.label,
            dataset_type: header.dataset_type,
            namestr_buf: Vec::new(),
            names: Vec::new(),
            columns: Vec::new(),
            record_length: 0,
            obs_buf: Vec::new(),
            rows: 0,
        }))
    }

    fn on_namestr_header(member: ActiveMember, record: &Record) -> Result<State> {
        match headers::parse_namestr_header(record) {
            Some(declared) => {
                // Advisory only; the block length decides the real count.
                debug!(declared, "found namestr header");
                Ok(State::AwaitingNamestrRecords(member))
            }
            None => Err(Error::bad_namestr_header(record)),
        }
    }

    fn on_namestr_records(&mut self, mut member: ActiveMember, record: &Record) -> Result<State> {
        if !headers::is_observation_header(record) {
            member.namestr_buf.extend_from_slice(record);
            return Ok(State::AwaitingNamestrRecords(member));
        }
        self.finish_namestrs(&mut member)?;
        Ok(State::AwaitingObservationRecords(member))
    }

    /// Re-segments the accumulated namestr bytes, validates the column set,
    /// and emits the two column header rows.
    fn finish_namestrs(&mut self, member: &mut ActiveMember) -> Result<()> {
        let buf = std::mem::take(&mut member.namestr_buf);
        for chunk in buf.chunks(NAMESTR_LEN) {
            match <&[u8; NAMESTR_LEN]>::try_from(chunk) {
                Ok(block) => member
                    .names
                    .push(namestr::unpack_namestr(block, &mut self.text)?),
                Err(_) => debug!(len = chunk.len(), "discarding short namestr tail"),
            }
        }

        let Some(last) = member.names.last() else {
            return Err(Error::bad_namestr("member declares no variables", &buf));
        };
        let record_length = last.position() + last.length();

        let mut total = 0usize;
        for name in &member.names {
            if name.position() + name.length() > record_length {
                return Err(Error::bad_namestr(
                    format!("variable {:?} extends past the record end", name.nname),
                    &buf,
                ));
            }
            total += name.length();
        }
        if total != record_length {
            return Err(Error::bad_namestr(
                format!("variable widths sum to {total} but the record length is {record_length}"),
                &buf,
            ));
        }

        member.record_length = record_length;
        member.columns = self.build_columns(&member.names)?;
        debug!(
            dataset = %member.meta.dataset_name,
            columns = member.names.len(),
            record_length,
            "namestrs complete"
        );

        let short: Vec<Option<String>> = member
            .names
            .iter()
            .map(|n| Some(n.nname.clone()))
            .collect();
        self.sink.write_row(&short)?;

        let labels: Vec<Option<String>> = member
            .names
            .iter()
            .map(|n| Some(n.nlabel.clone()))
            .collect();
        self.sink.write_row(&labels)?;

        Ok(())
    }

    fn build_columns(&self, names: &[Namestr]) -> Result<Vec<Column>> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let format = if name.is_character() || name.nform.is_empty() {
                None
            } else {
                match Format::lookup(&name.nform) {
                    Some(format) => Some(format),
                    None if self.options.lenient_formats => {
                        warn!(
                            column = %name.nname,
                            format = %name.nform,
                            "unknown numeric format, decoding as a plain number"
                        );
                        None
                    }
                    None => {
                        return Err(Error::UnknownFormat {
                            name: name.nform.clone(),
                        });
                    }
                }
            };
            columns.push(Column {
                name: name.nname.clone(),
                numeric: !name.is_character(),
                pos: name.position(),
                len: name.length(),
                format,
            });
        }
        Ok(columns)
    }

    fn on_observation_record(
        &mut self,
        mut member: ActiveMember,
        record: &Record,
    ) -> Result<State> {
        if headers::is_member_header(record) {
            self.finish_member(member);
            return Self::on_member_header(record);
        }
        member.obs_buf.extend_from_slice(record);
        self.drain_rows(&mut member)?;
        Ok(State::AwaitingObservationRecords(member))
    }

    fn drain_rows(&mut self, member: &mut ActiveMember) -> Result<()> {
        while member.obs_buf.len() >= member.record_length {
            // Record padding is indistinguishable from rows of zeros until
            // later bytes arrive, so rows are held back while everything
            // buffered is pad. Whatever is still held at the member boundary
            // is discarded as padding.
            if member.obs_buf.iter().all(|&b| b == 0 || b == PAD_CHAR) {
                break;
            }
            let row: Vec<u8> = member.obs_buf.drain(..member.record_length).collect();
            let fields = self.decode_row(&member.columns, &row)?;
            self.sink.write_row(&fields)?;
            member.rows += 1;
        }
        Ok(())
    }

    fn decode_row(&mut self, columns: &[Column], bytes: &[u8]) -> Result<Vec<Option<String>>> {
        let mut fields = Vec::with_capacity(columns.len());
        for col in columns {
            let raw = &bytes[col.pos..col.pos + col.len];
            let value = if col.numeric {
                let payload = ibm::widen(raw);
                match col.format {
                    Some(format) => formats::decode_value(format, &payload, &self.options)?,
                    None => self.decode_number(col, &payload)?,
                }
            } else {
                let s = text::unescape_unicode(&self.text.decode_trimmed(raw)?);
                if s.is_empty() { None } else { Some(s) }
            };
            fields.push(value);
        }
        Ok(fields)
    }

    fn decode_number(&self, col: &Column, payload: &[u8; 8]) -> Result<Option<String>> {
        let decoded = ibm::decode_ibm(payload)?;
        if decoded.truncated {
            warn!(column = %col.name, "precision lost narrowing IBM mantissa");
        }
        Ok(match decoded.value {
            IbmValue::Number(bits) => Some(f64::from_bits(bits).to_string()),
            IbmValue::Missing | IbmValue::Special(_) => None,
            IbmValue::Nan => Some("NaN".to_string()),
        })
    }

    fn finish_member(&mut self, member: ActiveMember) {
        if !member.obs_buf.is_empty() {
            if member.obs_buf.iter().all(|&b| b == 0 || b == PAD_CHAR) {
                debug!(
                    bytes = member.obs_buf.len(),
                    "discarding observation padding"
                );
            } else {
                warn!(
                    bytes = member.obs_buf.len(),
                    dataset = %member.meta.dataset_name,
                    "residual observation bytes are not padding"
                );
            }
        }
        debug!(
            dataset = %member.meta.dataset_name,
            rows = member.rows,
            "member complete"
        );
        self.document.members.push(Member {
            dataset_name: member.meta.dataset_name,
            dataset_label: member.dataset_label,
            dataset_type: member.dataset_type,
            sas_version: member.meta.sas_version,
            os: member.meta.os,
            created: member.meta.created,
            modified: member.modified,
            names: member.names,
            record_length: member.record_length,
            rows: member.rows,
        });
    }

    fn finish(mut self) -> Result<Document> {
        let state = std::mem::replace(&mut self.state, State::AwaitingLibraryHeader);
        match state {
            // An empty file and end-of-file between members are both clean.
            State::AwaitingLibraryHeader | State::AwaitingMemberHeader => {}
            State::AwaitingObservationRecords(member) => self.finish_member(member),
            other => {
                return Err(Error::ShortRead {
                    state: other.name(),
                });
            }
        }
        Ok(self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xpt::constants::RECORD_LEN;

    struct Rows(Vec<Vec<Option<String>>>);

    impl RowSink for Rows {
        fn write_row(&mut self, fields: &[Option<String>]) -> Result<()> {
            self.0.push(fields.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_empty_input_is_empty_document() {
        let mut rows = Rows(Vec::new());
        let doc = Parser::new(&mut rows, ReadOptions::default())
            .run(&b""[..])
            .unwrap();
        assert!(doc.members.is_empty());
        assert!(rows.0.is_empty());
    }

    #[test]
    fn test_garbage_first_record() {
        let mut rows = Rows(Vec::new());
        let err = Parser::new(&mut rows, ReadOptions::default())
            .run(&[0u8; RECORD_LEN][..])
            .unwrap_err();
        assert!(matches!(err, Error::BadLibraryHeader { .. }));
    }

    #[test]
    fn test_eof_mid_prologue_is_short_read() {
        let mut record = [b' '; RECORD_LEN];
        record[..48].copy_from_slice(b"HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!");
        record[48..78].copy_from_slice(&[b'0'; 30]);

        let mut rows = Rows(Vec::new());
        let err = Parser::new(&mut rows, ReadOptions::default())
            .run(&record[..])
            .unwrap_err();
        assert!(matches!(err, Error::ShortRead { .. }));
    }
}
