//! The system rows that introduce segments and records.

use crate::error::Result;
use crate::layout::Layout;
use crate::row::{RowBuffer, RowCursor};
use crate::schema::{RECORD_SCHEMA_ID, SEGMENT_SCHEMA_ID};

/// A segment header row.
///
/// `length` is the total byte length of the serialized segment row itself,
/// including the row header; a stream reader uses it to step over whatever
/// comment or padding the writer included.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Total length of the serialized segment row in bytes.
    pub length: i32,
    /// An optional comment describing the segment.
    pub comment: Option<String>,
    /// An optional schema description for the records that follow.
    pub sdl: Option<String>,
}

impl Segment {
    /// Creates a segment header.
    #[must_use]
    pub fn new(comment: Option<String>, sdl: Option<String>) -> Segment {
        Segment {
            length: 0,
            comment,
            sdl,
        }
    }

    /// Serializes this segment into a row initialized with the `Segment`
    /// system layout, recording the final row length in the `length` field.
    pub fn write(&mut self, row: &mut RowBuffer) -> Result<()> {
        assert_eq!(row.header().schema_id(), SEGMENT_SCHEMA_ID);
        let mut scope = RowCursor::create(row);
        let layout = scope.layout().clone();

        if let Some(comment) = &self.comment {
            row.write_variable_utf8(&mut scope, col(&layout, "comment"), comment)?;
        }
        if let Some(sdl) = &self.sdl {
            row.write_variable_utf8(&mut scope, col(&layout, "sdl"), sdl)?;
        }

        // The length is written last so it covers the entire row.
        self.length = row.length() as i32;
        row.write_fixed_i32(&scope, col(&layout, "length"), self.length)?;
        Ok(())
    }

    /// Reads only the `length` field of a segment row.
    ///
    /// Used while the full segment header (which may carry variable-length
    /// content) is still streaming in.
    pub(crate) fn read_length(row: &RowBuffer) -> Result<i32> {
        assert_eq!(row.header().schema_id(), SEGMENT_SCHEMA_ID);
        let scope = RowCursor::create_for_append(row);
        let layout = scope.layout().clone();
        Ok(opt(row.read_fixed_i32(&scope, col(&layout, "length")))?.unwrap_or_default())
    }

    /// Deserializes a segment header from a row.
    pub fn read(row: &RowBuffer) -> Result<Segment> {
        assert_eq!(row.header().schema_id(), SEGMENT_SCHEMA_ID);
        let scope = RowCursor::create(row);
        let layout = scope.layout().clone();

        Ok(Segment {
            length: opt(row.read_fixed_i32(&scope, col(&layout, "length")))?.unwrap_or_default(),
            comment: opt(row.read_variable_utf8(&scope, col(&layout, "comment")))?
                .map(str::to_owned),
            sdl: opt(row.read_variable_utf8(&scope, col(&layout, "sdl")))?.map(str::to_owned),
        })
    }
}

/// A record header row: the length and checksum of the payload row that
/// follows it in the stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// Length of the payload in bytes.
    pub length: i32,
    /// CRC-32 over the payload bytes.
    pub crc32: u32,
}

impl Record {
    /// Creates a record header for a payload.
    #[must_use]
    pub fn new(payload: &[u8]) -> Record {
        Record {
            length: payload.len() as i32,
            crc32: crc32fast::hash(payload),
        }
    }

    /// Serializes this record header into a row initialized with the
    /// `Record` system layout.
    pub fn write(&self, row: &mut RowBuffer) -> Result<()> {
        assert_eq!(row.header().schema_id(), RECORD_SCHEMA_ID);
        let scope = RowCursor::create(row);
        let layout = scope.layout().clone();

        row.write_fixed_i32(&scope, col(&layout, "length"), self.length)?;
        row.write_fixed_u32(&scope, col(&layout, "crc32"), self.crc32)?;
        Ok(())
    }

    /// Deserializes a record header from a row.
    pub fn read(row: &RowBuffer) -> Result<Record> {
        assert_eq!(row.header().schema_id(), RECORD_SCHEMA_ID);
        let scope = RowCursor::create(row);
        let layout = scope.layout().clone();

        Ok(Record {
            length: opt(row.read_fixed_i32(&scope, col(&layout, "length")))?.unwrap_or_default(),
            crc32: opt(row.read_fixed_u32(&scope, col(&layout, "crc32")))?.unwrap_or_default(),
        })
    }
}

fn col<'a>(layout: &'a Layout, path: &str) -> &'a crate::layout::LayoutColumn {
    layout
        .try_find(path)
        .unwrap_or_else(|| panic!("framing layout {} lacks column {path}", layout.name()))
}

fn opt<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(crate::error::Error::NotFound) => Ok(None),
        Err(err) => Err(err),
    }
}
