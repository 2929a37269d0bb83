//! Compiled column descriptors.

use super::args::{TypeArgument, TypeArgumentList};
use super::bit::LayoutBit;
use super::code::LayoutCode;
use super::typ::LayoutType;

/// The storage class of a schematized column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StorageKind {
    /// In-place value at a precomputed byte offset.
    Fixed,
    /// Length-prefixed value in the variable segment.
    Variable,
    /// Self-describing field in the sparse suffix.
    Sparse,
}

/// An immutable column within a compiled [`Layout`](super::Layout).
#[derive(Debug, PartialEq)]
pub struct LayoutColumn {
    size: u32,
    path: String,
    full_path: String,
    type_arg: TypeArgument,
    storage: StorageKind,
    parent: Option<usize>,
    index: u32,
    offset: u32,
    null_bit: LayoutBit,
    bool_bit: LayoutBit,
}

impl LayoutColumn {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        path: &str,
        full_path: String,
        typ: &'static LayoutType,
        type_args: TypeArgumentList,
        storage: StorageKind,
        parent: Option<usize>,
        index: u32,
        offset: u32,
        null_bit: LayoutBit,
        bool_bit: LayoutBit,
        length: u32,
    ) -> LayoutColumn {
        LayoutColumn {
            size: if typ.is_fixed() { typ.size() } else { length },
            path: path.to_owned(),
            full_path,
            type_arg: TypeArgument::new(typ, type_args),
            storage,
            parent,
            index,
            offset,
            null_bit,
            bool_bit,
        }
    }

    /// Computes the full logical path of a column given its parent.
    ///
    /// Object and UDT scopes join with `.`; array, set, and map scopes join
    /// with `[]`.
    pub(crate) fn full_path_of(parent: Option<&LayoutColumn>, path: &str) -> String {
        let Some(parent) = parent else {
            return path.to_owned();
        };
        match parent.layout_type().code().clear_immutable_bit() {
            LayoutCode::ObjectScope | LayoutCode::Schema => {
                format!("{}.{}", parent.full_path(), path)
            }
            LayoutCode::ArrayScope
            | LayoutCode::TypedArrayScope
            | LayoutCode::TypedSetScope
            | LayoutCode::TypedMapScope => format!("{}[]{}", parent.full_path(), path),
            code => panic!("parent scope type not supported: {code:?}"),
        }
    }

    /// The relative path of the field within its parent scope.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The full logical path of the field within the row.
    #[must_use]
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// The physical layout type of the field.
    #[must_use]
    pub fn layout_type(&self) -> &'static LayoutType {
        self.type_arg.layout_type()
    }

    /// The full logical type.
    #[must_use]
    pub fn type_arg(&self) -> &TypeArgument {
        &self.type_arg
    }

    /// For parameterized types, the type parameters.
    #[must_use]
    pub fn type_args(&self) -> &TypeArgumentList {
        self.type_arg.type_args()
    }

    /// The storage class of the field.
    #[must_use]
    pub fn storage(&self) -> StorageKind {
        self.storage
    }

    /// Index of the parent scope column within the layout, if nested.
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// 0-based column index; also selects the presence bit for the column.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// For fixed columns the byte offset of the value; for variable columns
    /// the 0-based index within the variable segment; unused for sparse.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// For nullable fields, the presence bit.
    #[must_use]
    pub fn null_bit(&self) -> LayoutBit {
        self.null_bit
    }

    /// For boolean fields, the bit storing the value.
    #[must_use]
    pub fn bool_bit(&self) -> LayoutBit {
        self.bool_bit
    }

    /// For fixed columns the reserved byte count; for variable columns the
    /// maximum allowed value length (0 = unbounded).
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    pub(crate) fn set_index(&mut self, index: u32) {
        self.index = index;
    }

    pub(crate) fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<usize>) {
        self.parent = parent;
    }
}
