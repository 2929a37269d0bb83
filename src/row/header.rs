//! The header that precedes all valid hybrid rows.

use crate::schema::SchemaId;

/// Versions of the hybrid row format.
///
/// A version from this list MUST be the first byte of every row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HybridRowVersion {
    /// Invalid sentinel.
    #[default]
    Invalid = 0,

    /// Initial version of the format.
    V1 = 0x81,
}

impl HybridRowVersion {
    /// Decodes a stored version byte.
    #[must_use]
    pub fn from_u8(value: u8) -> HybridRowVersion {
        if value == HybridRowVersion::V1 as u8 {
            HybridRowVersion::V1
        } else {
            HybridRowVersion::Invalid
        }
    }
}

/// The row header: a one-byte version followed by the schema id.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HybridRowHeader {
    version: HybridRowVersion,
    schema_id: SchemaId,
}

impl HybridRowHeader {
    /// Size in bytes of a serialized header.
    pub const SIZE: u32 = 1 + SchemaId::SIZE;

    /// Creates a header.
    #[must_use]
    pub fn new(version: HybridRowVersion, schema_id: SchemaId) -> HybridRowHeader {
        HybridRowHeader { version, schema_id }
    }

    /// The format version the row was written with.
    #[must_use]
    pub fn version(&self) -> HybridRowVersion {
        self.version
    }

    /// The id of the schema governing the row.
    #[must_use]
    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }
}
