//! Schema descriptions and their compilation into layouts.
//!
//! A [`Namespace`] holds named [`Schema`]s (and [`EnumSchema`]s); each schema
//! is a list of typed [`Property`]s.  Schemas are plain values: build them in
//! code, or (with the `serde` feature) load them from text.  Compiling a
//! schema yields the immutable [`Layout`](crate::layout::Layout) that governs
//! rows written against it.

mod compiler;
mod io;
mod system;

pub use io::{read_namespace, write_namespace};
pub use system::{
    ENUM_SCHEMA_SCHEMA_ID, ENUM_VALUE_SCHEMA_ID, NAMESPACE_SCHEMA_ID, PARTITION_KEY_SCHEMA_ID,
    PRIMARY_SORT_KEY_SCHEMA_ID, PROPERTY_SCHEMA_ID, PROPERTY_TYPE_SCHEMA_ID, RECORD_SCHEMA_ID,
    SCHEMA_OPTIONS_SCHEMA_ID, SCHEMA_SCHEMA_ID, SEGMENT_SCHEMA_ID, STATIC_KEY_SCHEMA_ID,
    system_namespace, system_resolver,
};

pub use crate::layout::StorageKind;

/// The unique identifier for a schema.
///
/// Identifiers must be unique within the scope of the resolver in which they
/// are used.  Zero is the invalid sentinel; negative values are permitted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SchemaId(i32);

impl SchemaId {
    /// Size in bytes of a serialized schema id.
    pub const SIZE: u32 = 4;

    /// Creates a schema id.
    #[must_use]
    pub const fn new(id: i32) -> SchemaId {
        SchemaId(id)
    }

    /// The invalid sentinel id.
    #[must_use]
    pub const fn invalid() -> SchemaId {
        SchemaId(0)
    }

    /// True if this is the invalid sentinel.
    #[must_use]
    pub fn is_invalid(self) -> bool {
        self.0 == 0
    }

    /// The underlying identifier.
    #[must_use]
    pub fn id(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Versions of the schema description language.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SchemaLanguageVersion {
    /// Initial version.
    V1 = 0,
    /// Schema language with enums.
    V2 = 1,
    /// No version was specified.
    #[default]
    Unspecified = 255,
}

impl SchemaLanguageVersion {
    /// The newest version of the language.
    pub const LATEST: SchemaLanguageVersion = SchemaLanguageVersion::V2;

    /// Decodes a stored version byte.
    #[must_use]
    pub fn from_u8(value: u8) -> SchemaLanguageVersion {
        match value {
            0 => SchemaLanguageVersion::V1,
            1 => SchemaLanguageVersion::V2,
            _ => SchemaLanguageVersion::Unspecified,
        }
    }
}

/// The primitive type kinds a property may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum TypeKind {
    /// Literal null.
    Null = 0,
    /// Boolean.
    Boolean = 1,
    /// 8-bit signed integer.
    Int8 = 2,
    /// 16-bit signed integer.
    Int16 = 3,
    /// 32-bit signed integer.
    Int32 = 4,
    /// 64-bit signed integer.
    Int64 = 5,
    /// 8-bit unsigned integer.
    UInt8 = 6,
    /// 16-bit unsigned integer.
    UInt16 = 7,
    /// 32-bit unsigned integer.
    UInt32 = 8,
    /// 64-bit unsigned integer.
    UInt64 = 9,
    /// Variable-length signed integer.
    VarInt = 10,
    /// Variable-length unsigned integer.
    VarUInt = 11,
    /// 32-bit IEEE float.
    Float32 = 12,
    /// 64-bit IEEE float.
    Float64 = 13,
    /// 128-bit IEEE float.
    Float128 = 14,
    /// 128-bit decimal.
    Decimal = 15,
    /// Tick-based date/time.
    DateTime = 16,
    /// Unix epoch date/time.
    UnixDateTime = 17,
    /// 16-byte GUID.
    Guid = 18,
    /// 12-byte MongoDB ObjectId.
    MongoDbObjectId = 19,
    /// UTF-8 string.
    Utf8 = 20,
    /// Byte string.
    Binary = 21,
}

impl TypeKind {
    /// Decodes a stored kind byte.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<TypeKind> {
        use TypeKind::*;
        Some(match value {
            0 => Null,
            1 => Boolean,
            2 => Int8,
            3 => Int16,
            4 => Int32,
            5 => Int64,
            6 => UInt8,
            7 => UInt16,
            8 => UInt32,
            9 => UInt64,
            10 => VarInt,
            11 => VarUInt,
            12 => Float32,
            13 => Float64,
            14 => Float128,
            15 => Decimal,
            16 => DateTime,
            17 => UnixDateTime,
            18 => Guid,
            19 => MongoDbObjectId,
            20 => Utf8,
            21 => Binary,
            _ => return None,
        })
    }
}

/// The logical type of a property.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase", tag = "type"))]
pub enum PropertyType {
    /// A scalar.
    Primitive {
        /// The scalar kind.
        kind: TypeKind,
        /// The storage class for the column.
        storage: StorageKind,
        /// True if the column may be absent.
        nullable: bool,
        /// For fixed strings/binary the reserved byte count, for variable
        /// the maximum value length (0 = unbounded).
        #[cfg_attr(feature = "serde", serde(default))]
        length: u32,
    },

    /// A nested path-keyed scope.
    Object {
        /// The nested properties; all stored sparse.
        properties: Vec<Property>,
        /// True if the value may be absent.
        nullable: bool,
        /// True if the scope's fields cannot be updated individually.
        #[cfg_attr(feature = "serde", serde(default))]
        immutable: bool,
    },

    /// An array; untyped when `items` is `None`.
    Array {
        /// The element type.
        items: Option<Box<PropertyType>>,
        /// True if the value may be absent.
        nullable: bool,
        /// True if the scope's elements cannot be updated individually.
        #[cfg_attr(feature = "serde", serde(default))]
        immutable: bool,
    },

    /// A unique set ordered by binary collation.
    Set {
        /// The element type.
        items: Box<PropertyType>,
        /// True if the value may be absent.
        nullable: bool,
        /// True if the scope's elements cannot be updated individually.
        #[cfg_attr(feature = "serde", serde(default))]
        immutable: bool,
    },

    /// A unique map of key/value pairs ordered by key collation.
    Map {
        /// The key type.
        keys: Box<PropertyType>,
        /// The value type.
        values: Box<PropertyType>,
        /// True if the value may be absent.
        nullable: bool,
        /// True if the scope's elements cannot be updated individually.
        #[cfg_attr(feature = "serde", serde(default))]
        immutable: bool,
    },

    /// A fixed-arity tuple.
    Tuple {
        /// The element types.
        items: Vec<PropertyType>,
        /// True if the value may be absent.
        nullable: bool,
        /// True if the scope's elements cannot be updated individually.
        #[cfg_attr(feature = "serde", serde(default))]
        immutable: bool,
    },

    /// A tagged union of one or two values with a leading `uint8` tag.
    Tagged {
        /// The value types (one or two).
        items: Vec<PropertyType>,
        /// True if the value may be absent.
        nullable: bool,
        /// True if the scope's elements cannot be updated individually.
        #[cfg_attr(feature = "serde", serde(default))]
        immutable: bool,
    },

    /// A user-defined type governed by another schema in the namespace.
    Udt {
        /// The name of the target schema.
        name: String,
        /// The target schema id; resolved by name when invalid.
        #[cfg_attr(feature = "serde", serde(default))]
        schema_id: SchemaId,
        /// True if the value may be absent.
        nullable: bool,
        /// True if the scope's fields cannot be updated individually.
        #[cfg_attr(feature = "serde", serde(default))]
        immutable: bool,
    },
}

impl PropertyType {
    /// A primitive property type with no length constraint.
    #[must_use]
    pub fn primitive(kind: TypeKind, storage: StorageKind, nullable: bool) -> PropertyType {
        PropertyType::Primitive {
            kind,
            storage,
            nullable,
            length: 0,
        }
    }

    /// True if values of this type may be absent.
    #[must_use]
    pub fn nullable(&self) -> bool {
        match self {
            PropertyType::Primitive { nullable, .. }
            | PropertyType::Object { nullable, .. }
            | PropertyType::Array { nullable, .. }
            | PropertyType::Set { nullable, .. }
            | PropertyType::Map { nullable, .. }
            | PropertyType::Tuple { nullable, .. }
            | PropertyType::Tagged { nullable, .. }
            | PropertyType::Udt { nullable, .. } => *nullable,
        }
    }
}

/// A single named, typed property of a schema.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Property {
    /// The property path relative to its parent scope.
    pub path: String,
    /// The property's type.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub property_type: PropertyType,
    /// An optional comment.
    #[cfg_attr(feature = "serde", serde(default))]
    pub comment: Option<String>,
    /// An optional host-language facing name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub api_name: Option<String>,
}

impl Property {
    /// Creates a property.
    #[must_use]
    pub fn new(path: &str, property_type: PropertyType) -> Property {
        Property {
            path: path.to_owned(),
            property_type,
            comment: None,
            api_name: None,
        }
    }
}

/// Options modifying how a schema's rows behave.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaOptions {
    /// Disallow properties not described by the schema.
    #[cfg_attr(feature = "serde", serde(default))]
    pub disallow_unschematized: bool,
    /// Track per-property modification timestamps.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enable_property_level_timestamps: bool,
    /// Omit the system-defined prefix properties.
    #[cfg_attr(feature = "serde", serde(default))]
    pub disable_system_prefix: bool,
    /// The schema only exists to be referenced by other schemas.
    #[cfg_attr(feature = "serde", serde(default))]
    pub abstract_schema: bool,
}

/// Sort order of a primary sort key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending = 0,
    /// Descending order.
    Descending = 1,
}

/// Identifies a property used as a partition key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionKey {
    /// The property path.
    pub path: String,
}

/// Identifies a property used as a primary sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrimarySortKey {
    /// The property path.
    pub path: String,
    /// The sort order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub direction: SortDirection,
}

/// Identifies a property stored once per partition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticKey {
    /// The property path.
    pub path: String,
}

/// A named schema: an ordered list of typed properties plus key metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schema {
    /// The schema name, unique within its namespace.
    pub name: String,
    /// The schema id, unique within its resolver.
    #[cfg_attr(feature = "serde", serde(rename = "id"))]
    pub schema_id: SchemaId,
    /// The schema language version this schema was written against.
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: SchemaLanguageVersion,
    /// An optional comment.
    #[cfg_attr(feature = "serde", serde(default))]
    pub comment: Option<String>,
    /// Row behavior options.
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: SchemaOptions,
    /// Partition key properties.
    #[cfg_attr(feature = "serde", serde(default))]
    pub partition_keys: Vec<PartitionKey>,
    /// Primary sort key properties.
    #[cfg_attr(feature = "serde", serde(default))]
    pub primary_sort_keys: Vec<PrimarySortKey>,
    /// Static key properties.
    #[cfg_attr(feature = "serde", serde(default))]
    pub static_keys: Vec<StaticKey>,
    /// The properties, in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: Vec<Property>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(name: &str, schema_id: SchemaId) -> Schema {
        Schema {
            name: name.to_owned(),
            schema_id,
            version: SchemaLanguageVersion::Unspecified,
            comment: None,
            options: SchemaOptions::default(),
            partition_keys: Vec::new(),
            primary_sort_keys: Vec::new(),
            static_keys: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// The schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema id.
    #[must_use]
    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }
}

/// A single named constant of an [`EnumSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumValue {
    /// The constant's name.
    pub name: String,
    /// The constant's value.
    pub value: i64,
    /// An optional comment.
    #[cfg_attr(feature = "serde", serde(default))]
    pub comment: Option<String>,
}

/// A named enumeration over an integral base type.
///
/// Enum schemas are carried through namespace serialization; the layout
/// compiler stores enum-typed properties as their base type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumSchema {
    /// The enum name, unique within its namespace.
    pub name: String,
    /// The integral base kind.
    pub base_kind: TypeKind,
    /// An optional comment.
    #[cfg_attr(feature = "serde", serde(default))]
    pub comment: Option<String>,
    /// The named constants.
    #[cfg_attr(feature = "serde", serde(default))]
    pub values: Vec<EnumValue>,
}

/// A collection of schemas under one name.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Namespace {
    /// The namespace name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// The schema language version of the namespace.
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: SchemaLanguageVersion,
    /// An optional comment.
    #[cfg_attr(feature = "serde", serde(default))]
    pub comment: Option<String>,
    /// The schemas.
    #[cfg_attr(feature = "serde", serde(default))]
    pub schemas: Vec<Schema>,
    /// The enum schemas.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enums: Vec<EnumSchema>,
}

impl Namespace {
    /// The schemas in this namespace.
    #[must_use]
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    /// The enum schemas in this namespace.
    #[must_use]
    pub fn enums(&self) -> &[EnumSchema] {
        &self.enums
    }

    /// The schema language version in effect.
    #[must_use]
    pub fn effective_sdl_version(&self) -> SchemaLanguageVersion {
        if self.version != SchemaLanguageVersion::Unspecified {
            self.version
        } else {
            SchemaLanguageVersion::LATEST
        }
    }
}
