//! Bit-allocator and offset-planner that assembles [`Layout`]s.

use super::Layout;
use super::args::TypeArgumentList;
use super::bit::{BitAllocator, LayoutBit};
use super::column::{LayoutColumn, StorageKind};
use super::typ::LayoutType;
use crate::schema::SchemaId;

/// Builds a [`Layout`] column by column.
///
/// A row is laid out as:
///
/// ```text
/// [ <present bits>
///   <bool bits>
///   <fixed_1> <fixed_2> ... <fixed_n>
///   <var_1> <var_2> ... <var_m>
///   <sparse_1> <sparse_2> ... <sparse_o>
/// ]
/// ```
///
/// Columns may be added in any order; [`LayoutBuilder::build`] interleaves
/// them into the final physical order and fixes up offsets and indices.
pub struct LayoutBuilder {
    name: String,
    schema_id: SchemaId,
    fixed_size: u32,
    fixed_count: u32,
    var_count: u32,
    sparse_count: u32,
    bit_allocator: BitAllocator,
    fixed_columns: Vec<LayoutColumn>,
    var_columns: Vec<LayoutColumn>,
    sparse_columns: Vec<LayoutColumn>,
    // Positions into sparse_columns of the open object scopes.
    scope: Vec<usize>,
}

impl LayoutBuilder {
    /// Creates a builder for the named schema.
    #[must_use]
    pub fn new(name: &str, schema_id: SchemaId) -> LayoutBuilder {
        LayoutBuilder {
            name: name.to_owned(),
            schema_id,
            fixed_size: 0,
            fixed_count: 0,
            var_count: 0,
            sparse_count: 0,
            bit_allocator: BitAllocator::default(),
            fixed_columns: Vec::new(),
            var_columns: Vec::new(),
            sparse_columns: Vec::new(),
            scope: Vec::new(),
        }
    }

    fn parent(&self) -> Option<&LayoutColumn> {
        self.scope.last().map(|&i| &self.sparse_columns[i])
    }

    fn parent_pos(&self) -> Option<usize> {
        self.scope.last().copied()
    }

    /// Adds a fixed-storage column.
    ///
    /// Booleans take a value bit (plus a presence bit if nullable); `Null`
    /// columns must be nullable; all other scalars reserve `type.size()`
    /// bytes, or `length` bytes for fixed-length strings/binary.
    pub fn add_fixed_column(
        &mut self,
        path: &str,
        typ: &'static LayoutType,
        nullable: bool,
        length: u32,
    ) {
        assert!(!typ.is_varint());

        let full_path = LayoutColumn::full_path_of(self.parent(), path);
        let col = if typ.is_null() {
            assert!(nullable);
            let null_bit = self.bit_allocator.allocate();
            LayoutColumn::new(
                path,
                full_path,
                typ,
                TypeArgumentList::default(),
                StorageKind::Fixed,
                self.parent_pos(),
                self.fixed_count,
                0,
                null_bit,
                LayoutBit::invalid(),
                0,
            )
        } else if typ.is_bool() {
            let null_bit = if nullable {
                self.bit_allocator.allocate()
            } else {
                LayoutBit::invalid()
            };
            let bool_bit = self.bit_allocator.allocate();
            LayoutColumn::new(
                path,
                full_path,
                typ,
                TypeArgumentList::default(),
                StorageKind::Fixed,
                self.parent_pos(),
                self.fixed_count,
                0,
                null_bit,
                bool_bit,
                0,
            )
        } else {
            let null_bit = if nullable {
                self.bit_allocator.allocate()
            } else {
                LayoutBit::invalid()
            };
            let col = LayoutColumn::new(
                path,
                full_path,
                typ,
                TypeArgumentList::default(),
                StorageKind::Fixed,
                self.parent_pos(),
                self.fixed_count,
                self.fixed_size,
                null_bit,
                LayoutBit::invalid(),
                length,
            );
            self.fixed_size += if typ.is_fixed() { typ.size() } else { length };
            col
        };

        self.fixed_count += 1;
        self.fixed_columns.push(col);
    }

    /// Adds a variable-storage column; `length` caps the value size
    /// (0 = unbounded).
    pub fn add_variable_column(&mut self, path: &str, typ: &'static LayoutType, length: u32) {
        assert!(typ.allow_variable());

        let full_path = LayoutColumn::full_path_of(self.parent(), path);
        let null_bit = self.bit_allocator.allocate();
        let col = LayoutColumn::new(
            path,
            full_path,
            typ,
            TypeArgumentList::default(),
            StorageKind::Variable,
            self.parent_pos(),
            self.var_count,
            self.var_count,
            null_bit,
            LayoutBit::invalid(),
            length,
        );
        self.var_count += 1;
        self.var_columns.push(col);
    }

    /// Adds a sparse-storage column; no bits or bytes are reserved.
    pub fn add_sparse_column(&mut self, path: &str, typ: &'static LayoutType) {
        let col = self.sparse(path, typ, TypeArgumentList::default());
        self.sparse_columns.push(col);
    }

    /// Opens an object scope; subsequent columns become its children until
    /// [`LayoutBuilder::end_object_scope`].
    pub fn add_object_scope(&mut self, path: &str, typ: &'static LayoutType) {
        let col = self.sparse(path, typ, TypeArgumentList::default());
        self.sparse_columns.push(col);
        self.scope.push(self.sparse_columns.len() - 1);
    }

    /// Closes the innermost object scope.
    pub fn end_object_scope(&mut self) {
        assert!(!self.scope.is_empty());
        self.scope.pop();
    }

    /// Adds a typed scope column (typed array/set/map/tuple/nullable/UDT)
    /// with its type arguments.
    pub fn add_typed_scope(
        &mut self,
        path: &str,
        typ: &'static LayoutType,
        type_args: TypeArgumentList,
    ) {
        let col = self.sparse(path, typ, type_args);
        self.sparse_columns.push(col);
    }

    fn sparse(
        &mut self,
        path: &str,
        typ: &'static LayoutType,
        type_args: TypeArgumentList,
    ) -> LayoutColumn {
        let full_path = LayoutColumn::full_path_of(self.parent(), path);
        let col = LayoutColumn::new(
            path,
            full_path,
            typ,
            type_args,
            StorageKind::Sparse,
            self.parent_pos(),
            self.sparse_count,
            u32::MAX,
            LayoutBit::invalid(),
            LayoutBit::invalid(),
            0,
        );
        self.sparse_count += 1;
        col
    }

    /// Freezes the builder into an immutable [`Layout`].
    ///
    /// Fixed offsets are shifted past the bitmask bytes; variable indices
    /// are shifted past the fixed columns so they become global column
    /// indices.
    #[must_use]
    pub fn build(mut self) -> Layout {
        let fixed_delta = self.bit_allocator.num_bytes();
        let var_index_delta = self.fixed_count;
        let sparse_base = (self.fixed_count + self.var_count) as usize;

        let mut columns =
            Vec::with_capacity(self.fixed_columns.len() + self.var_columns.len() + self.sparse_columns.len());

        for mut c in self.fixed_columns.drain(..) {
            c.set_offset(c.offset() + fixed_delta);
            columns.push(c);
        }

        for mut c in self.var_columns.drain(..) {
            // Variable column indexes begin immediately following the last
            // fixed column.
            c.set_index(c.index() + var_index_delta);
            columns.push(c);
        }

        for mut c in self.sparse_columns.drain(..) {
            // Parent positions were recorded against the sparse segment.
            if let Some(pos) = c.parent() {
                c.set_parent(Some(sparse_base + pos));
            }
            columns.push(c);
        }

        Layout::new(
            &self.name,
            self.schema_id,
            self.bit_allocator.num_bytes(),
            self.fixed_size + fixed_delta,
            columns,
        )
    }
}
