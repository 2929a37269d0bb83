//! Wire-level type codes.

/// Type codes as they appear on the wire.
///
/// Scope codes come in mutable/immutable pairs that differ only in the low
/// bit.  `BooleanFalse` encodes the value `false` directly in the type code;
/// `Boolean` doubles as `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LayoutCode {
    /// Invalid sentinel; never written.
    Invalid = 0,

    /// Literal null value.
    Null = 1,
    /// Boolean `false`, encoded in the type code itself.
    BooleanFalse = 2,
    /// Boolean type; doubles as the encoding of `true`.
    Boolean = 3,

    /// 8-bit signed integer.
    Int8 = 5,
    /// 16-bit signed integer.
    Int16 = 6,
    /// 32-bit signed integer.
    Int32 = 7,
    /// 64-bit signed integer.
    Int64 = 8,
    /// 8-bit unsigned integer.
    UInt8 = 9,
    /// 16-bit unsigned integer.
    UInt16 = 10,
    /// 32-bit unsigned integer.
    UInt32 = 11,
    /// 64-bit unsigned integer.
    UInt64 = 12,
    /// Variable-length ZigZag-encoded signed integer.
    VarInt = 13,
    /// Variable-length LEB128-encoded unsigned integer.
    VarUInt = 14,
    /// 32-bit IEEE float.
    Float32 = 15,
    /// 64-bit IEEE float.
    Float64 = 16,
    /// 128-bit IEEE float.
    Float128 = 17,
    /// 128-bit decimal.
    Decimal = 18,
    /// Tick-based date/time.
    DateTime = 19,
    /// Unix epoch date/time.
    UnixDateTime = 20,
    /// 16-byte GUID.
    Guid = 21,
    /// 12-byte MongoDB ObjectId.
    MongoDbObjectId = 22,
    /// Length-prefixed UTF-8 string.
    Utf8 = 23,
    /// Length-prefixed byte string.
    Binary = 24,

    /// Path-keyed scope terminated by [`LayoutCode::EndScope`].
    ObjectScope = 30,
    /// Immutable variant of [`LayoutCode::ObjectScope`].
    ImmutableObjectScope = 31,
    /// Untyped indexed scope terminated by [`LayoutCode::EndScope`].
    ArrayScope = 32,
    /// Immutable variant of [`LayoutCode::ArrayScope`].
    ImmutableArrayScope = 33,
    /// Sized, homogeneously typed indexed scope.
    TypedArrayScope = 34,
    /// Immutable variant of [`LayoutCode::TypedArrayScope`].
    ImmutableTypedArrayScope = 35,
    /// Fixed-arity untyped scope.
    TupleScope = 36,
    /// Immutable variant of [`LayoutCode::TupleScope`].
    ImmutableTupleScope = 37,
    /// Fixed-arity typed scope with implicit element types.
    TypedTupleScope = 38,
    /// Immutable variant of [`LayoutCode::TypedTupleScope`].
    ImmutableTypedTupleScope = 39,
    /// Reserved untyped map scope.
    MapScope = 40,
    /// Immutable variant of [`LayoutCode::MapScope`].
    ImmutableMapScope = 41,
    /// Unique scope of key/value pair tuples ordered by key collation.
    TypedMapScope = 42,
    /// Immutable variant of [`LayoutCode::TypedMapScope`].
    ImmutableTypedMapScope = 43,
    /// Reserved untyped set scope.
    SetScope = 44,
    /// Immutable variant of [`LayoutCode::SetScope`].
    ImmutableSetScope = 45,
    /// Unique scope of elements ordered by binary collation.
    TypedSetScope = 46,
    /// Immutable variant of [`LayoutCode::TypedSetScope`].
    ImmutableTypedSetScope = 47,
    /// Single-element scope with a leading has-value byte.
    NullableScope = 48,
    /// Immutable variant of [`LayoutCode::NullableScope`].
    ImmutableNullableScope = 49,
    /// Fixed-arity (tag, value) scope with an implicit `UInt8` tag type.
    TaggedScope = 50,
    /// Immutable variant of [`LayoutCode::TaggedScope`].
    ImmutableTaggedScope = 51,
    /// Fixed-arity (tag, value, value) scope with an implicit `UInt8` tag.
    Tagged2Scope = 52,
    /// Immutable variant of [`LayoutCode::Tagged2Scope`].
    ImmutableTagged2Scope = 53,

    /// Embedded user-defined type governed by a nested layout.
    Schema = 68,
    /// Immutable variant of [`LayoutCode::Schema`].
    ImmutableSchema = 69,

    /// Scope terminator sentinel.
    EndScope = 70,
}

impl LayoutCode {
    /// Size in bytes of a serialized type code.
    pub const WIRE_SIZE: u32 = 1;

    /// Decodes a wire byte into a `LayoutCode`.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<LayoutCode> {
        use LayoutCode::*;
        Some(match value {
            0 => Invalid,
            1 => Null,
            2 => BooleanFalse,
            3 => Boolean,
            5 => Int8,
            6 => Int16,
            7 => Int32,
            8 => Int64,
            9 => UInt8,
            10 => UInt16,
            11 => UInt32,
            12 => UInt64,
            13 => VarInt,
            14 => VarUInt,
            15 => Float32,
            16 => Float64,
            17 => Float128,
            18 => Decimal,
            19 => DateTime,
            20 => UnixDateTime,
            21 => Guid,
            22 => MongoDbObjectId,
            23 => Utf8,
            24 => Binary,
            30 => ObjectScope,
            31 => ImmutableObjectScope,
            32 => ArrayScope,
            33 => ImmutableArrayScope,
            34 => TypedArrayScope,
            35 => ImmutableTypedArrayScope,
            36 => TupleScope,
            37 => ImmutableTupleScope,
            38 => TypedTupleScope,
            39 => ImmutableTypedTupleScope,
            40 => MapScope,
            41 => ImmutableMapScope,
            42 => TypedMapScope,
            43 => ImmutableTypedMapScope,
            44 => SetScope,
            45 => ImmutableSetScope,
            46 => TypedSetScope,
            47 => ImmutableTypedSetScope,
            48 => NullableScope,
            49 => ImmutableNullableScope,
            50 => TaggedScope,
            51 => ImmutableTaggedScope,
            52 => Tagged2Scope,
            53 => ImmutableTagged2Scope,
            68 => Schema,
            69 => ImmutableSchema,
            70 => EndScope,
            _ => return None,
        })
    }

    /// Returns the same scope code without the immutable bit set.
    #[must_use]
    pub fn clear_immutable_bit(self) -> LayoutCode {
        LayoutCode::from_u8((self as u8) & 0xFE).unwrap_or(LayoutCode::Invalid)
    }

    /// True if, even within a typed scope, this element type always requires
    /// a type code on the wire because the value itself lives in the code.
    #[must_use]
    pub fn always_requires_type_code(self) -> bool {
        matches!(
            self,
            LayoutCode::Boolean | LayoutCode::BooleanFalse | LayoutCode::Null
        )
    }

    /// Returns the canonicalized version of the code.
    ///
    /// Codes that also encode values (`BooleanFalse`) map back to the type
    /// code used for schema comparisons.
    #[must_use]
    pub fn canonicalize(self) -> LayoutCode {
        if self == LayoutCode::BooleanFalse {
            LayoutCode::Boolean
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immutable_bit_pairs() {
        assert_eq!(
            LayoutCode::ImmutableTypedSetScope.clear_immutable_bit(),
            LayoutCode::TypedSetScope
        );
        assert_eq!(
            LayoutCode::ObjectScope.clear_immutable_bit(),
            LayoutCode::ObjectScope
        );
    }

    #[test]
    fn wire_codes_round_trip() {
        for raw in 0u8..=255 {
            if let Some(code) = LayoutCode::from_u8(raw) {
                assert_eq!(code as u8, raw);
            }
        }
    }

    #[test]
    fn canonical_boolean() {
        assert_eq!(
            LayoutCode::BooleanFalse.canonicalize(),
            LayoutCode::Boolean
        );
        assert!(LayoutCode::Null.always_requires_type_code());
        assert!(!LayoutCode::Int32.always_requires_type_code());
    }
}
