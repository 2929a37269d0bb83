//! Static descriptors for every physical layout type.
//!
//! The wire format dispatches on [`LayoutCode`]; each code maps to exactly
//! one `LayoutType` describing its size class and scope behavior.  The
//! descriptors live in a static table so they can be shared by reference for
//! the process lifetime.

use super::code::LayoutCode;

/// Describes the physical layout type of a field.
///
/// `LayoutType` is immutable; all instances are `'static` and addressed via
/// [`from_code`].
#[derive(Debug)]
pub struct LayoutType {
    code: LayoutCode,
    name: &'static str,
    size: u32,
    fixed: bool,
    scope: bool,
    sized_scope: bool,
    indexed_scope: bool,
    fixed_arity: bool,
    unique_scope: bool,
    typed_scope: bool,
}

impl LayoutType {
    const fn scalar(code: LayoutCode, name: &'static str, size: u32, fixed: bool) -> LayoutType {
        LayoutType {
            code,
            name,
            size,
            fixed,
            scope: false,
            sized_scope: false,
            indexed_scope: false,
            fixed_arity: false,
            unique_scope: false,
            typed_scope: false,
        }
    }

    const fn scope(
        code: LayoutCode,
        name: &'static str,
        sized_scope: bool,
        indexed_scope: bool,
        fixed_arity: bool,
        unique_scope: bool,
        typed_scope: bool,
    ) -> LayoutType {
        LayoutType {
            code,
            name,
            size: 0,
            fixed: false,
            scope: true,
            sized_scope,
            indexed_scope,
            fixed_arity,
            unique_scope,
            typed_scope,
        }
    }

    /// The physical layout code used to represent the type on the wire.
    #[must_use]
    pub fn code(&self) -> LayoutCode {
        self.code
    }

    /// Human readable name of the type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// If fixed, the fixed size of the type's serialization in bytes.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// True if this type is always fixed length.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// True if this type can be used in the variable-length segment.
    #[must_use]
    pub fn allow_variable(&self) -> bool {
        !self.fixed
    }

    /// True if this type is a literal null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.code == LayoutCode::Null
    }

    /// True if this type is a boolean.
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self.code, LayoutCode::Boolean | LayoutCode::BooleanFalse)
    }

    /// True if this type is a variable-length encoded integer (signed or
    /// unsigned).
    #[must_use]
    pub fn is_varint(&self) -> bool {
        matches!(self.code, LayoutCode::VarInt | LayoutCode::VarUInt)
    }

    /// True if this scope's nested fields cannot be updated individually.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.scope && (self.code as u8) & 1 == 1
    }

    /// True if this type is a scope.
    #[must_use]
    pub fn is_scope(&self) -> bool {
        self.scope
    }

    /// True if this type is a user-defined type scope.
    #[must_use]
    pub fn is_udt(&self) -> bool {
        matches!(self.code, LayoutCode::Schema | LayoutCode::ImmutableSchema)
    }

    /// True if this is the scope terminator sentinel.
    #[must_use]
    pub fn is_end_scope(&self) -> bool {
        self.code == LayoutCode::EndScope
    }

    /// True if this is a nullable scope.
    #[must_use]
    pub fn is_nullable_scope(&self) -> bool {
        matches!(
            self.code,
            LayoutCode::NullableScope | LayoutCode::ImmutableNullableScope
        )
    }

    /// True if this is a typed tuple scope (including tagged forms).
    #[must_use]
    pub fn is_typed_tuple_scope(&self) -> bool {
        matches!(
            self.code.clear_immutable_bit(),
            LayoutCode::TypedTupleScope | LayoutCode::TaggedScope | LayoutCode::Tagged2Scope
        )
    }

    /// True if this is a typed map scope.
    #[must_use]
    pub fn is_typed_map_scope(&self) -> bool {
        matches!(
            self.code,
            LayoutCode::TypedMapScope | LayoutCode::ImmutableTypedMapScope
        )
    }

    /// True if the scope's serialized header carries a 4-byte element count.
    #[must_use]
    pub fn is_sized_scope(&self) -> bool {
        self.sized_scope
    }

    /// True if the scope's elements are identified by position rather than
    /// by path.
    #[must_use]
    pub fn is_indexed_scope(&self) -> bool {
        self.indexed_scope
    }

    /// True if the scope's arity is fixed by its type arguments.
    #[must_use]
    pub fn is_fixed_arity(&self) -> bool {
        self.fixed_arity
    }

    /// True if the scope's elements are collation-ordered and distinct.
    #[must_use]
    pub fn is_unique_scope(&self) -> bool {
        self.unique_scope
    }

    /// True if the scope's element types are carried in its type arguments.
    #[must_use]
    pub fn is_typed_scope(&self) -> bool {
        self.typed_scope
    }
}

impl PartialEq for LayoutType {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for LayoutType {}

impl std::fmt::Display for LayoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Descriptor for the int8 type.
pub static INT8: LayoutType = LayoutType::scalar(LayoutCode::Int8, "int8", 1, true);
/// Descriptor for the int16 type.
pub static INT16: LayoutType = LayoutType::scalar(LayoutCode::Int16, "int16", 2, true);
/// Descriptor for the int32 type.
pub static INT32: LayoutType = LayoutType::scalar(LayoutCode::Int32, "int32", 4, true);
/// Descriptor for the int64 type.
pub static INT64: LayoutType = LayoutType::scalar(LayoutCode::Int64, "int64", 8, true);
/// Descriptor for the uint8 type.
pub static UINT8: LayoutType = LayoutType::scalar(LayoutCode::UInt8, "uint8", 1, true);
/// Descriptor for the uint16 type.
pub static UINT16: LayoutType = LayoutType::scalar(LayoutCode::UInt16, "uint16", 2, true);
/// Descriptor for the uint32 type.
pub static UINT32: LayoutType = LayoutType::scalar(LayoutCode::UInt32, "uint32", 4, true);
/// Descriptor for the uint64 type.
pub static UINT64: LayoutType = LayoutType::scalar(LayoutCode::UInt64, "uint64", 8, true);
/// Descriptor for the var int type.
pub static VAR_INT: LayoutType = LayoutType::scalar(LayoutCode::VarInt, "varint", 0, false);
/// Descriptor for the var uint type.
pub static VAR_UINT: LayoutType = LayoutType::scalar(LayoutCode::VarUInt, "varuint", 0, false);
/// Descriptor for the float32 type.
pub static FLOAT32: LayoutType = LayoutType::scalar(LayoutCode::Float32, "float32", 4, true);
/// Descriptor for the float64 type.
pub static FLOAT64: LayoutType = LayoutType::scalar(LayoutCode::Float64, "float64", 8, true);
/// Descriptor for the float128 type.
pub static FLOAT128: LayoutType = LayoutType::scalar(LayoutCode::Float128, "float128", 16, true);
/// Descriptor for the decimal type.
pub static DECIMAL: LayoutType = LayoutType::scalar(LayoutCode::Decimal, "decimal", 16, true);
/// Descriptor for the date time type.
pub static DATE_TIME: LayoutType = LayoutType::scalar(LayoutCode::DateTime, "datetime", 8, true);
/// Descriptor for the unix date time type.
pub static UNIX_DATE_TIME: LayoutType =
    LayoutType::scalar(LayoutCode::UnixDateTime, "unixdatetime", 8, true);
/// Descriptor for the guid type.
pub static GUID: LayoutType = LayoutType::scalar(LayoutCode::Guid, "guid", 16, true);
/// Descriptor for the mongo object id type.
pub static MONGO_OBJECT_ID: LayoutType =
    LayoutType::scalar(LayoutCode::MongoDbObjectId, "mongodbobjectid", 12, true);
/// Descriptor for the null type.
pub static NULL: LayoutType = LayoutType::scalar(LayoutCode::Null, "null", 0, true);
/// Descriptor for the boolean type.
pub static BOOLEAN: LayoutType = LayoutType::scalar(LayoutCode::Boolean, "bool", 0, true);
/// Descriptor for the boolean false type.
pub static BOOLEAN_FALSE: LayoutType =
    LayoutType::scalar(LayoutCode::BooleanFalse, "bool", 0, true);
/// Descriptor for the utf8 type.
pub static UTF8: LayoutType = LayoutType::scalar(LayoutCode::Utf8, "utf8", 0, false);
/// Descriptor for the binary type.
pub static BINARY: LayoutType = LayoutType::scalar(LayoutCode::Binary, "binary", 0, false);

/// Descriptor for the object type.
pub static OBJECT: LayoutType =
    LayoutType::scope(LayoutCode::ObjectScope, "object", false, false, false, false, false);
/// Descriptor for the immutable object type.
pub static IMMUTABLE_OBJECT: LayoutType = LayoutType::scope(
    LayoutCode::ImmutableObjectScope,
    "im_object",
    false,
    false,
    false,
    false,
    false,
);
/// Descriptor for the array type.
pub static ARRAY: LayoutType =
    LayoutType::scope(LayoutCode::ArrayScope, "array", false, true, false, false, false);
/// Descriptor for the immutable array type.
pub static IMMUTABLE_ARRAY: LayoutType = LayoutType::scope(
    LayoutCode::ImmutableArrayScope,
    "im_array",
    false,
    true,
    false,
    false,
    false,
);
/// Descriptor for the typed array type.
pub static TYPED_ARRAY: LayoutType = LayoutType::scope(
    LayoutCode::TypedArrayScope,
    "array_t",
    true,
    true,
    false,
    false,
    true,
);
/// Descriptor for the immutable typed array type.
pub static IMMUTABLE_TYPED_ARRAY: LayoutType = LayoutType::scope(
    LayoutCode::ImmutableTypedArrayScope,
    "im_array_t",
    true,
    true,
    false,
    false,
    true,
);
/// Descriptor for the typed set type.
pub static TYPED_SET: LayoutType =
    LayoutType::scope(LayoutCode::TypedSetScope, "set_t", true, true, false, true, true);
/// Descriptor for the immutable typed set type.
pub static IMMUTABLE_TYPED_SET: LayoutType = LayoutType::scope(
    LayoutCode::ImmutableTypedSetScope,
    "im_set_t",
    true,
    true,
    false,
    true,
    true,
);
/// Descriptor for the typed map type.
pub static TYPED_MAP: LayoutType =
    LayoutType::scope(LayoutCode::TypedMapScope, "map_t", true, true, false, true, true);
/// Descriptor for the immutable typed map type.
pub static IMMUTABLE_TYPED_MAP: LayoutType = LayoutType::scope(
    LayoutCode::ImmutableTypedMapScope,
    "im_map_t",
    true,
    true,
    false,
    true,
    true,
);
/// Descriptor for the tuple type.
pub static TUPLE: LayoutType =
    LayoutType::scope(LayoutCode::TupleScope, "tuple", false, true, true, false, false);
/// Descriptor for the immutable tuple type.
pub static IMMUTABLE_TUPLE: LayoutType = LayoutType::scope(
    LayoutCode::ImmutableTupleScope,
    "im_tuple",
    false,
    true,
    true,
    false,
    false,
);
/// Descriptor for the typed tuple type.
pub static TYPED_TUPLE: LayoutType = LayoutType::scope(
    LayoutCode::TypedTupleScope,
    "tuple_t",
    true,
    true,
    true,
    false,
    true,
);
/// Descriptor for the immutable typed tuple type.
pub static IMMUTABLE_TYPED_TUPLE: LayoutType = LayoutType::scope(
    LayoutCode::ImmutableTypedTupleScope,
    "im_tuple_t",
    true,
    true,
    true,
    false,
    true,
);
/// Descriptor for the tagged type.
pub static TAGGED: LayoutType =
    LayoutType::scope(LayoutCode::TaggedScope, "tagged_t", true, true, true, false, true);
/// Descriptor for the immutable tagged type.
pub static IMMUTABLE_TAGGED: LayoutType = LayoutType::scope(
    LayoutCode::ImmutableTaggedScope,
    "im_tagged_t",
    true,
    true,
    true,
    false,
    true,
);
/// Descriptor for the tagged2 type.
pub static TAGGED2: LayoutType = LayoutType::scope(
    LayoutCode::Tagged2Scope,
    "tagged2_t",
    true,
    true,
    true,
    false,
    true,
);
/// Descriptor for the immutable tagged2 type.
pub static IMMUTABLE_TAGGED2: LayoutType = LayoutType::scope(
    LayoutCode::ImmutableTagged2Scope,
    "im_tagged2_t",
    true,
    true,
    true,
    false,
    true,
);
/// Descriptor for the nullable type.
pub static NULLABLE: LayoutType = LayoutType::scope(
    LayoutCode::NullableScope,
    "nullable",
    true,
    true,
    true,
    false,
    true,
);
/// Descriptor for the immutable nullable type.
pub static IMMUTABLE_NULLABLE: LayoutType = LayoutType::scope(
    LayoutCode::ImmutableNullableScope,
    "im_nullable",
    true,
    true,
    true,
    false,
    true,
);
/// Descriptor for the udt type.
pub static UDT: LayoutType =
    LayoutType::scope(LayoutCode::Schema, "udt", false, false, false, false, false);
/// Descriptor for the immutable udt type.
pub static IMMUTABLE_UDT: LayoutType = LayoutType::scope(
    LayoutCode::ImmutableSchema,
    "im_udt",
    false,
    false,
    false,
    false,
    false,
);
/// Descriptor for the end scope type.
pub static END_SCOPE: LayoutType =
    LayoutType::scope(LayoutCode::EndScope, "end", false, false, false, false, false);

/// Returns the static descriptor for a layout code.
///
/// # Panics
/// Panics on codes that have no descriptor (reserved or invalid codes); a
/// code read from a row that reaches this state indicates corruption already
/// detected upstream.
#[must_use]
pub fn from_code(code: LayoutCode) -> &'static LayoutType {
    use LayoutCode::*;
    match code {
        Int8 => &INT8,
        Int16 => &INT16,
        Int32 => &INT32,
        Int64 => &INT64,
        UInt8 => &UINT8,
        UInt16 => &UINT16,
        UInt32 => &UINT32,
        UInt64 => &UINT64,
        VarInt => &VAR_INT,
        VarUInt => &VAR_UINT,
        Float32 => &FLOAT32,
        Float64 => &FLOAT64,
        Float128 => &FLOAT128,
        Decimal => &DECIMAL,
        DateTime => &DATE_TIME,
        UnixDateTime => &UNIX_DATE_TIME,
        Guid => &GUID,
        MongoDbObjectId => &MONGO_OBJECT_ID,
        Null => &NULL,
        Boolean => &BOOLEAN,
        BooleanFalse => &BOOLEAN_FALSE,
        Utf8 => &UTF8,
        Binary => &BINARY,
        ObjectScope => &OBJECT,
        ImmutableObjectScope => &IMMUTABLE_OBJECT,
        ArrayScope => &ARRAY,
        ImmutableArrayScope => &IMMUTABLE_ARRAY,
        TypedArrayScope => &TYPED_ARRAY,
        ImmutableTypedArrayScope => &IMMUTABLE_TYPED_ARRAY,
        TypedSetScope => &TYPED_SET,
        ImmutableTypedSetScope => &IMMUTABLE_TYPED_SET,
        TypedMapScope => &TYPED_MAP,
        ImmutableTypedMapScope => &IMMUTABLE_TYPED_MAP,
        TupleScope => &TUPLE,
        ImmutableTupleScope => &IMMUTABLE_TUPLE,
        TypedTupleScope => &TYPED_TUPLE,
        ImmutableTypedTupleScope => &IMMUTABLE_TYPED_TUPLE,
        TaggedScope => &TAGGED,
        ImmutableTaggedScope => &IMMUTABLE_TAGGED,
        Tagged2Scope => &TAGGED2,
        ImmutableTagged2Scope => &IMMUTABLE_TAGGED2,
        NullableScope => &NULLABLE,
        ImmutableNullableScope => &IMMUTABLE_NULLABLE,
        Schema => &UDT,
        ImmutableSchema => &IMMUTABLE_UDT,
        EndScope => &END_SCOPE,
        Invalid | MapScope | ImmutableMapScope | SetScope | ImmutableSetScope => {
            panic!("no layout type for code {code:?}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_consistent() {
        for raw in 0u8..=255 {
            let Some(code) = LayoutCode::from_u8(raw) else {
                continue;
            };
            if matches!(
                code,
                LayoutCode::Invalid
                    | LayoutCode::MapScope
                    | LayoutCode::ImmutableMapScope
                    | LayoutCode::SetScope
                    | LayoutCode::ImmutableSetScope
            ) {
                continue;
            }
            let t = from_code(code);
            assert_eq!(t.code(), code);
        }
    }

    #[test]
    fn immutable_flags_follow_low_bit() {
        assert!(!TYPED_SET.is_immutable());
        assert!(IMMUTABLE_TYPED_SET.is_immutable());
        assert!(IMMUTABLE_TYPED_SET.is_unique_scope());
        assert!(TYPED_MAP.is_typed_map_scope());
        assert!(NULLABLE.is_fixed_arity());
        assert!(!OBJECT.is_indexed_scope());
        assert!(UDT.is_udt());
    }
}
