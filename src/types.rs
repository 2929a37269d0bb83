//! Value wrappers for the scalar wire types that have no native Rust
//! counterpart.  All of these are opaque bit-blobs of a fixed width; the
//! encoder copies them verbatim and compares them by bit equality.

pub use uuid::Uuid as Guid;

/// An IEEE 754-2008 binary128 value carried as two 64-bit halves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Float128 {
    /// Low-order 64 bits.
    pub low: u64,
    /// High-order 64 bits (sign, exponent, and leading significand bits).
    pub high: u64,
}

/// A 128-bit fixed-point decimal value, stored as raw bits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decimal {
    /// The 16-byte representation, copied verbatim onto the wire.
    pub bits: [u8; 16],
}

/// A date/time value expressed as a 64-bit tick count.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateTime {
    /// 100ns ticks.
    pub ticks: i64,
}

/// A date/time value expressed as milliseconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnixDateTime {
    /// Milliseconds since 1970-01-01T00:00:00Z.
    pub milliseconds: i64,
}

/// A 12-byte MongoDB ObjectId.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MongoObjectId {
    /// The raw id bytes.
    pub bytes: [u8; 12],
}

/// The unit value of a literal null field.
///
/// Null fields carry their value entirely in the type code; reading one
/// yields this marker.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NullValue;
