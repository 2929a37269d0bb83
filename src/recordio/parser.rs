//! A push parser for RecordIO streams.

use super::segment::{Record, Segment};
use crate::error::{Error, Result};
use crate::row::{HybridRowHeader, HybridRowVersion, RowBuffer};
use crate::schema::{RECORD_SCHEMA_ID, SEGMENT_SCHEMA_ID, system_resolver};

/// What the parser produced from one call to [`RecordIoParser::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production<'a> {
    /// Nothing was produced; at least `need` bytes are required to advance
    /// the parser.  It is recommended not to call `process` again until
    /// that many bytes are available.
    None {
        /// The smallest number of bytes needed to advance.
        need: u32,
    },

    /// A segment header row was produced.
    Segment(&'a [u8]),

    /// A record payload within the current segment was produced.
    Record(&'a [u8]),
}

/// The states of the parser's internal machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No buffers have yet been provided to the parser.
    Start,
    /// Unrecoverable parse error encountered.
    Error,
    /// Parsing the segment header length.
    NeedSegmentLength,
    /// Parsing the segment header.
    NeedSegment,
    /// Parsing a row header.
    NeedHeader,
    /// Parsing a record header.
    NeedRecord,
    /// Parsing a record payload.
    NeedRow,
}

/// A streaming push parser over segment/record framed byte streams.
///
/// The parser is intended to be fed a sequence of buffers; it signals when
/// the boundaries of framing tokens are reached.  It never mutates or
/// copies caller buffers: productions are views into the input.
pub struct RecordIoParser {
    state: State,
    segment: Option<Segment>,
    record: Option<Record>,
}

impl Default for RecordIoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordIoParser {
    /// Creates a parser at the start of a stream.
    #[must_use]
    pub fn new() -> RecordIoParser {
        RecordIoParser {
            state: State::Start,
            segment: None,
            record: None,
        }
    }

    /// True if a valid segment header has been parsed.
    #[must_use]
    pub fn have_segment(&self) -> bool {
        matches!(self.state, State::NeedHeader | State::NeedRecord | State::NeedRow)
    }

    /// The current active segment.
    ///
    /// # Panics
    /// Panics unless [`RecordIoParser::have_segment`] is true.
    #[must_use]
    pub fn segment(&self) -> &Segment {
        assert!(self.have_segment());
        self.segment.as_ref().expect("segment parsed")
    }

    /// Consumes one buffer's worth of data, possibly advancing the parser.
    ///
    /// Returns the production and the number of bytes consumed from the
    /// buffer; consumed bytes must not be offered again.  Corruption (a bad
    /// version byte, an unknown header schema, a CRC mismatch) fails with
    /// `InvalidRow` and moves the parser to a terminal error state; the
    /// caller chooses whether to resynchronize with a fresh parser.
    pub fn process<'a>(&mut self, buffer: &'a [u8]) -> (Result<Production<'a>>, usize) {
        let mut b: &[u8] = buffer;
        let err = loop {
            #[cfg(feature = "tracing")]
            tracing::trace!(state = ?self.state, available = b.len(), "recordio step");
            match self.state {
                State::Start => {
                    self.state = State::NeedSegmentLength;
                }

                State::NeedSegmentLength => {
                    let minimal = (HybridRowHeader::SIZE + segment_row_size()) as usize;
                    if b.len() < minimal {
                        let consumed = buffer.len() - b.len();
                        return (
                            Ok(Production::None {
                                need: minimal as u32,
                            }),
                            consumed,
                        );
                    }

                    let length = match decode_segment_length(&b[..minimal]) {
                        Ok(length) => length,
                        Err(err) => break err,
                    };
                    self.segment = Some(Segment {
                        length,
                        ..Segment::default()
                    });
                    self.state = State::NeedSegment;
                }

                State::NeedSegment => {
                    let length = self.segment.as_ref().expect("segment length parsed").length;
                    let minimal = (HybridRowHeader::SIZE + segment_row_size()) as usize;
                    if length < minimal as i32 {
                        break Error::InvalidRow;
                    }
                    let length = length as usize;
                    if b.len() < length {
                        let consumed = buffer.len() - b.len();
                        return (
                            Ok(Production::None {
                                need: length as u32,
                            }),
                            consumed,
                        );
                    }

                    // Re-decode over the full header: it may carry a
                    // comment or trailing padding beyond the minimal row.
                    let segment = match decode_segment(&b[..length]) {
                        Ok(segment) => segment,
                        Err(err) => break err,
                    };
                    self.segment = Some(segment);

                    let produced = &b[..length];
                    b = &b[length..];
                    self.state = State::NeedHeader;
                    let consumed = buffer.len() - b.len();
                    return (Ok(Production::Segment(produced)), consumed);
                }

                State::NeedHeader => {
                    if b.len() < HybridRowHeader::SIZE as usize {
                        let consumed = buffer.len() - b.len();
                        return (
                            Ok(Production::None {
                                need: HybridRowHeader::SIZE,
                            }),
                            consumed,
                        );
                    }

                    if HybridRowVersion::from_u8(b[0]) != HybridRowVersion::V1 {
                        break Error::InvalidRow;
                    }

                    let schema_id =
                        crate::schema::SchemaId::new(i32::from_le_bytes(b[1..5].try_into().unwrap()));
                    if schema_id == SEGMENT_SCHEMA_ID {
                        // Nested segment.
                        self.state = State::NeedSegmentLength;
                    } else if schema_id == RECORD_SCHEMA_ID {
                        self.state = State::NeedRecord;
                    } else {
                        break Error::InvalidRow;
                    }
                }

                State::NeedRecord => {
                    let minimal = (HybridRowHeader::SIZE + record_row_size()) as usize;
                    if b.len() < minimal {
                        let consumed = buffer.len() - b.len();
                        return (
                            Ok(Production::None {
                                need: minimal as u32,
                            }),
                            consumed,
                        );
                    }

                    let record = match decode_record(&b[..minimal]) {
                        Ok(record) => record,
                        Err(err) => break err,
                    };
                    if record.length < 0 {
                        break Error::InvalidRow;
                    }
                    self.record = Some(record);
                    b = &b[minimal..];
                    self.state = State::NeedRow;
                }

                State::NeedRow => {
                    let record = self.record.as_ref().expect("record header parsed");
                    let length = record.length as usize;
                    if b.len() < length {
                        let consumed = buffer.len() - b.len();
                        return (
                            Ok(Production::None {
                                need: length as u32,
                            }),
                            consumed,
                        );
                    }

                    let payload = &b[..length];

                    // Validate that the record has not been corrupted.
                    if crc32fast::hash(payload) != record.crc32 {
                        break Error::InvalidRow;
                    }

                    b = &b[length..];
                    self.state = State::NeedHeader;
                    let consumed = buffer.len() - b.len();
                    return (Ok(Production::Record(payload)), consumed);
                }

                State::Error => break Error::Failure,
            }
        };

        self.state = State::Error;
        let consumed = buffer.len() - b.len();
        (Err(err), consumed)
    }
}

fn segment_row_size() -> u32 {
    system_resolver().resolve(SEGMENT_SCHEMA_ID).size()
}

fn record_row_size() -> u32 {
    system_resolver().resolve(RECORD_SCHEMA_ID).size()
}

/// Validates the raw header bytes before handing them to a row, so that a
/// corrupt stream surfaces as `InvalidRow` rather than an unresolvable
/// schema id.
fn check_header(bytes: &[u8], expected: crate::schema::SchemaId) -> Result<()> {
    if HybridRowVersion::from_u8(bytes[0]) != HybridRowVersion::V1 {
        return Err(Error::InvalidRow);
    }
    let schema_id = i32::from_le_bytes(bytes[1..5].try_into().unwrap());
    if schema_id != expected.id() {
        return Err(Error::InvalidRow);
    }
    Ok(())
}

fn decode_segment_length(bytes: &[u8]) -> Result<i32> {
    check_header(bytes, SEGMENT_SCHEMA_ID)?;
    let mut row = RowBuffer::new();
    if !row.read_from(bytes, HybridRowVersion::V1, system_resolver()) {
        return Err(Error::InvalidRow);
    }
    Segment::read_length(&row)
}

fn decode_segment(bytes: &[u8]) -> Result<Segment> {
    check_header(bytes, SEGMENT_SCHEMA_ID)?;
    let mut row = RowBuffer::new();
    if !row.read_from(bytes, HybridRowVersion::V1, system_resolver()) {
        return Err(Error::InvalidRow);
    }
    Segment::read(&row)
}

fn decode_record(bytes: &[u8]) -> Result<Record> {
    check_header(bytes, RECORD_SCHEMA_ID)?;
    let mut row = RowBuffer::new();
    if !row.read_from(bytes, HybridRowVersion::V1, system_resolver()) {
        return Err(Error::InvalidRow);
    }
    Record::read(&row)
}
