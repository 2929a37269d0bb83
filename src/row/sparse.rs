//! The sparse-field protocol: self-describing metadata, scope management,
//! and the single shift/grow routine behind every sparse mutation.

use super::buffer::RowBuffer;
use super::cursor::RowCursor;
use super::options::{RowOptions, UpdateOptions};
use crate::codec;
use crate::error::{Error, Result};
use crate::layout::{LayoutCode, LayoutType, TypeArgument, TypeArgumentList, typ};

impl LayoutType {
    /// True if writing an item in this scope elides the element's type code
    /// because it is implied by the scope's type arguments.
    pub(crate) fn has_implicit_type_code(&self, edit: &RowCursor) -> bool {
        match self.code().clear_immutable_bit() {
            LayoutCode::TypedArrayScope | LayoutCode::TypedSetScope => {
                debug_assert_eq!(edit.scope_type_args.len(), 1);
                !edit.scope_type_args[0]
                    .layout_type()
                    .code()
                    .always_requires_type_code()
            }
            LayoutCode::TypedTupleScope | LayoutCode::TaggedScope | LayoutCode::Tagged2Scope => {
                debug_assert!(edit.scope_type_args.len() > edit.index as usize);
                !edit.scope_type_args[edit.index as usize]
                    .layout_type()
                    .code()
                    .always_requires_type_code()
            }
            LayoutCode::NullableScope => {
                debug_assert_eq!(edit.scope_type_args.len(), 1);
                debug_assert_eq!(edit.index, 1);
                !edit.scope_type_args[0]
                    .layout_type()
                    .code()
                    .always_requires_type_code()
            }
            LayoutCode::TypedMapScope => true,
            _ => false,
        }
    }

    /// Fills the cursor's cell type from the scope's type arguments.
    pub(crate) fn set_implicit_type_code(&self, edit: &mut RowCursor) {
        match self.code().clear_immutable_bit() {
            LayoutCode::TypedArrayScope | LayoutCode::TypedSetScope => {
                edit.cell_type = Some(edit.scope_type_args[0].layout_type());
                edit.cell_type_args = edit.scope_type_args[0].type_args().clone();
            }
            LayoutCode::TypedTupleScope | LayoutCode::TaggedScope | LayoutCode::Tagged2Scope => {
                let arg = &edit.scope_type_args[edit.index as usize];
                edit.cell_type = Some(arg.layout_type());
                edit.cell_type_args = arg.type_args().clone();
            }
            LayoutCode::NullableScope => {
                debug_assert_eq!(edit.index, 1);
                edit.cell_type = Some(edit.scope_type_args[0].layout_type());
                edit.cell_type_args = edit.scope_type_args[0].type_args().clone();
            }
            LayoutCode::TypedMapScope => {
                edit.cell_type = Some(if self.is_immutable() {
                    &typ::IMMUTABLE_TYPED_TUPLE
                } else {
                    &typ::TYPED_TUPLE
                });
                edit.cell_type_args = edit.scope_type_args.clone();
            }
            code => panic!("no implicit type codes in {code:?}"),
        }
    }

    /// For unique scopes, the logical element type.
    pub(crate) fn field_type(&self, scope: &RowCursor) -> TypeArgument {
        match self.code().clear_immutable_bit() {
            LayoutCode::TypedSetScope => scope.scope_type_args[0].clone(),
            LayoutCode::TypedMapScope => TypeArgument::new(
                if scope.scope_type.is_immutable() {
                    &typ::IMMUTABLE_TYPED_TUPLE
                } else {
                    &typ::TYPED_TUPLE
                },
                scope.scope_type_args.clone(),
            ),
            code => panic!("not a unique scope: {code:?}"),
        }
    }
}

/// Number of bytes needed to serialize a type plus its type arguments.
pub(crate) fn count_type_argument(typ: &'static LayoutType, args: &TypeArgumentList) -> u32 {
    let code_size = LayoutCode::WIRE_SIZE;
    match typ.code().clear_immutable_bit() {
        LayoutCode::Schema => code_size + crate::schema::SchemaId::SIZE,
        LayoutCode::TypedArrayScope | LayoutCode::TypedSetScope | LayoutCode::NullableScope => {
            debug_assert_eq!(args.len(), 1);
            code_size + count_argument(&args[0])
        }
        LayoutCode::TupleScope | LayoutCode::TypedTupleScope => {
            let mut len = code_size + codec::count_varuint(args.len() as u64);
            for arg in args {
                len += count_argument(arg);
            }
            len
        }
        LayoutCode::TaggedScope => {
            debug_assert_eq!(args.len(), 2);
            code_size + count_argument(&args[1])
        }
        LayoutCode::Tagged2Scope => {
            debug_assert_eq!(args.len(), 3);
            code_size + count_argument(&args[1]) + count_argument(&args[2])
        }
        LayoutCode::TypedMapScope => {
            debug_assert_eq!(args.len(), 2);
            code_size + count_argument(&args[0]) + count_argument(&args[1])
        }
        _ => code_size,
    }
}

fn count_argument(arg: &TypeArgument) -> u32 {
    count_type_argument(arg.layout_type(), arg.type_args())
}

impl RowBuffer {
    pub(crate) fn read_sparse_type_code(&self, offset: u32) -> &'static LayoutType {
        let raw = self.get_u8(offset);
        let code = LayoutCode::from_u8(raw)
            .unwrap_or_else(|| panic!("unknown type code {raw} at offset {offset}"));
        typ::from_code(code)
    }

    pub(crate) fn write_sparse_type_code(&mut self, offset: u32, code: LayoutCode) {
        self.put_u8(offset, code as u8);
    }

    /// Serializes a type plus its arguments; returns the bytes written.
    pub(crate) fn write_type_argument(
        &mut self,
        offset: u32,
        typ: &'static LayoutType,
        args: &TypeArgumentList,
    ) -> u32 {
        self.write_sparse_type_code(offset, typ.code());
        let mut len = LayoutCode::WIRE_SIZE;
        match typ.code().clear_immutable_bit() {
            LayoutCode::Schema => {
                self.write_schema_id(offset + len, args.schema_id());
                len += crate::schema::SchemaId::SIZE;
            }
            LayoutCode::TypedArrayScope | LayoutCode::TypedSetScope | LayoutCode::NullableScope => {
                debug_assert_eq!(args.len(), 1);
                len += self.write_argument(offset + len, &args[0]);
            }
            LayoutCode::TupleScope | LayoutCode::TypedTupleScope => {
                len += self.put_varuint(offset + len, args.len() as u64);
                for arg in args {
                    len += self.write_argument(offset + len, arg);
                }
            }
            LayoutCode::TaggedScope => {
                debug_assert_eq!(args.len(), 2);
                len += self.write_argument(offset + len, &args[1]);
            }
            LayoutCode::Tagged2Scope => {
                debug_assert_eq!(args.len(), 3);
                len += self.write_argument(offset + len, &args[1]);
                len += self.write_argument(offset + len, &args[2]);
            }
            LayoutCode::TypedMapScope => {
                debug_assert_eq!(args.len(), 2);
                len += self.write_argument(offset + len, &args[0]);
                len += self.write_argument(offset + len, &args[1]);
            }
            _ => {}
        }
        len
    }

    fn write_argument(&mut self, offset: u32, arg: &TypeArgument) -> u32 {
        self.write_type_argument(offset, arg.layout_type(), arg.type_args())
    }

    /// Reads one type argument (code plus nested arguments).
    pub(crate) fn read_type_argument(&self, offset: u32) -> (TypeArgument, u32) {
        let item_type = self.read_sparse_type_code(offset);
        let (item_args, args_len) =
            self.read_type_argument_list(offset + LayoutCode::WIRE_SIZE, item_type);
        (
            TypeArgument::new(item_type, item_args),
            LayoutCode::WIRE_SIZE + args_len,
        )
    }

    /// Reads the type-argument list of `typ` starting just past its code.
    pub(crate) fn read_type_argument_list(
        &self,
        offset: u32,
        typ: &'static LayoutType,
    ) -> (TypeArgumentList, u32) {
        match typ.code().clear_immutable_bit() {
            LayoutCode::Schema => (
                TypeArgumentList::from_schema_id(self.read_schema_id(offset)),
                crate::schema::SchemaId::SIZE,
            ),
            LayoutCode::TypedArrayScope | LayoutCode::TypedSetScope | LayoutCode::NullableScope => {
                let (arg, len) = self.read_type_argument(offset);
                (TypeArgumentList::from(arg), len)
            }
            LayoutCode::TupleScope | LayoutCode::TypedTupleScope => {
                let (num, mut len) = self.get_varuint(offset);
                let mut args = Vec::with_capacity(num as usize);
                for _ in 0..num {
                    let (arg, item_len) = self.read_type_argument(offset + len as u32);
                    args.push(arg);
                    len += item_len;
                }
                (args.into(), len)
            }
            LayoutCode::TaggedScope => {
                // The leading uint8 tag type is implicit on the wire.
                let (arg, len) = self.read_type_argument(offset);
                (vec![TypeArgument::of(&typ::UINT8), arg].into(), len)
            }
            LayoutCode::Tagged2Scope => {
                let mut args = vec![TypeArgument::of(&typ::UINT8)];
                let mut len = 0;
                for _ in 0..2 {
                    let (arg, item_len) = self.read_type_argument(offset + len);
                    args.push(arg);
                    len += item_len;
                }
                (args.into(), len)
            }
            LayoutCode::TypedMapScope => {
                let mut args = Vec::with_capacity(2);
                let mut len = 0;
                for _ in 0..2 {
                    let (arg, item_len) = self.read_type_argument(offset + len);
                    args.push(arg);
                    len += item_len;
                }
                (args.into(), len)
            }
            _ => (TypeArgumentList::default(), 0),
        }
    }

    // --- sparse paths ---

    /// Reads the length of an encoded, optionally tokenized, sparse path.
    ///
    /// Tokenized paths return the token, the token's encoded size, and no
    /// path offset; inline paths return the combined length including the
    /// size prefix and the offset where the raw bytes begin.
    pub(crate) fn read_sparse_path_len(
        &self,
        edit_layout: &crate::layout::Layout,
        offset: u32,
    ) -> (u32, u32, u32) {
        let (token, size_len) = self.get_varuint(offset);
        let tokenizer = edit_layout.tokenizer();
        if token < tokenizer.count() {
            return (token as u32, size_len, offset);
        }

        let num_bytes = token as u32 - tokenizer.count() as u32;
        (token as u32, num_bytes + size_len, offset + size_len)
    }

    /// The path of the field the cursor is positioned on.
    pub(crate) fn read_sparse_path<'a>(&'a self, edit: &'a RowCursor) -> &'a str {
        if let Some(path) = edit.layout.tokenizer().try_find_string(u64::from(edit.path_token)) {
            return path;
        }

        let num_bytes = edit.path_token - edit.layout.tokenizer().count() as u32;
        let start = edit.path_offset as usize;
        std::str::from_utf8(&self.buf[start..start + num_bytes as usize])
            .expect("row contains invalid utf8 path")
    }

    pub(crate) fn write_sparse_path(&mut self, edit: &mut RowCursor, offset: u32) {
        // Indexed scopes never encode paths.
        if edit.scope_type.is_indexed_scope() {
            edit.path_token = 0;
            edit.path_offset = 0;
            return;
        }

        if let Some(token) = &edit.write_path_token {
            let varint = token.varint().to_vec();
            self.buf[offset as usize..offset as usize + varint.len()].copy_from_slice(&varint);
            edit.path_token = token.id() as u32;
            edit.path_offset = offset;
        } else {
            let path = edit.write_path.clone().unwrap_or_default();
            edit.path_token = (edit.layout.tokenizer().count() + path.len() as u64) as u32;
            let size_len = self.put_varuint(offset, u64::from(edit.path_token));
            edit.path_offset = offset + size_len;
            let start = (offset + size_len) as usize;
            self.buf[start..start + path.len()].copy_from_slice(path.as_bytes());
        }
    }

    /// Number of bytes the write path will occupy, caching the interned
    /// token on the cursor when one exists.
    pub(crate) fn count_sparse_path(&self, edit: &mut RowCursor) -> u32 {
        if edit.write_path_token.is_none() {
            let interned = edit
                .write_path
                .as_deref()
                .and_then(|path| edit.layout.tokenizer().try_find_token(path))
                .cloned();
            edit.write_path_token = interned;
        }

        if let Some(token) = &edit.write_path_token {
            return token.varint().len() as u32;
        }

        let num_bytes = edit.write_path.as_deref().unwrap_or_default().len() as u32;
        let size_len =
            codec::count_varuint(edit.layout.tokenizer().count() + u64::from(num_bytes));
        size_len + num_bytes
    }

    // --- the single shift/grow routine ---

    /// Ensures sufficient space exists in the row to write the current
    /// sparse value, shifting the remainder of the row.
    ///
    /// Returns `(meta_bytes, space_needed, shift)`: the metadata size of
    /// the new field, the total bytes for field plus metadata, and the
    /// number of bytes the row grew by (negative when it shrank).  The
    /// caller applies the shift to the row length after writing the value.
    pub(crate) fn ensure_sparse(
        &mut self,
        edit: &mut RowCursor,
        cell_type: &'static LayoutType,
        type_args: &TypeArgumentList,
        num_bytes: u32,
        options: RowOptions,
    ) -> (u32, u32, i32) {
        let meta_offset = edit.meta_offset;
        let mut space_available = 0;

        let mut meta_bytes = if edit.scope_type.has_implicit_type_code(edit) {
            0
        } else {
            count_type_argument(cell_type, type_args)
        };

        if !edit.scope_type.is_indexed_scope() {
            meta_bytes += self.count_sparse_path(edit);
        }

        if edit.exists {
            // The existing field is overwritten; reclaim all of it.
            space_available = self.sparse_compute_size(edit);
        }

        let space_needed = if options == RowOptions::Delete {
            0
        } else {
            meta_bytes + num_bytes
        };
        let shift = space_needed as i32 - space_available as i32;
        if shift > 0 {
            self.ensure(self.length + shift as u32);
        }

        let src = (meta_offset + space_available) as usize;
        let dst = (meta_offset + space_needed) as usize;
        let tail = (self.length - (meta_offset + space_available)) as usize;
        self.buf.copy_within(src..src + tail, dst);

        #[cfg(debug_assertions)]
        if shift < 0 {
            // Fill vacated bytes to catch offset errors early.
            let end = self.length as usize;
            let start = (self.length as i64 + i64::from(shift)) as usize;
            self.buf[start..end].fill(0xFF);
        }

        // Fixed-arity scopes don't store a count; it is implied by the type
        // arguments.
        if edit.scope_type.is_sized_scope() && !edit.scope_type.is_fixed_arity() {
            if options == RowOptions::Insert
                || options == RowOptions::InsertAt
                || (options == RowOptions::Upsert && !edit.exists)
            {
                debug_assert!(!edit.exists);
                self.increment_u32(edit.start, 1);
                edit.count += 1;
            } else if options == RowOptions::Delete && edit.exists {
                debug_assert!(self.get_u32(edit.start) > 0);
                self.decrement_u32(edit.start, 1);
                edit.count -= 1;
            }
        }

        if options == RowOptions::Delete {
            edit.cell_type = None;
            edit.cell_type_args = TypeArgumentList::default();
            edit.exists = false;
        } else {
            edit.cell_type = Some(cell_type);
            edit.cell_type_args = type_args.clone();
            edit.exists = true;
        }

        (meta_bytes, space_needed, shift)
    }

    /// Writes the metadata (type code, type arguments, and path) of the
    /// field at the cursor.
    pub(crate) fn write_sparse_metadata(
        &mut self,
        edit: &mut RowCursor,
        cell_type: &'static LayoutType,
        type_args: &TypeArgumentList,
        meta_bytes: u32,
    ) {
        let mut meta_offset = edit.meta_offset;
        if !edit.scope_type.has_implicit_type_code(edit) {
            meta_offset += self.write_type_argument(meta_offset, cell_type, type_args);
        }
        self.write_sparse_path(edit, meta_offset);
        edit.value_offset = edit.meta_offset + meta_bytes;
    }

    /// Reads the metadata of the encoded sparse field at the cursor's
    /// metadata offset, filling in its cell type, type arguments, path, and
    /// value offset.
    pub(crate) fn read_sparse_metadata(&self, edit: &mut RowCursor) {
        if edit.scope_type.has_implicit_type_code(edit) {
            edit.scope_type.set_implicit_type_code(edit);
            edit.value_offset = edit.meta_offset;
        } else {
            let cell_type = self.read_sparse_type_code(edit.meta_offset);
            edit.cell_type = Some(cell_type);
            edit.value_offset = edit.meta_offset + LayoutCode::WIRE_SIZE;
            edit.cell_type_args = TypeArgumentList::default();
            if cell_type.is_end_scope() {
                // Reached the end of the scope without finding another field.
                edit.path_token = 0;
                edit.path_offset = 0;
                edit.value_offset = edit.meta_offset;
                return;
            }

            let (args, args_len) = self.read_type_argument_list(edit.value_offset, cell_type);
            edit.cell_type_args = args;
            edit.value_offset += args_len;
        }

        if edit.scope_type.is_indexed_scope() {
            edit.path_token = 0;
            edit.path_offset = 0;
        } else {
            let (token, path_len, path_offset) =
                self.read_sparse_path_len(&edit.layout, edit.value_offset);
            edit.path_token = token;
            edit.path_offset = path_offset;
            edit.value_offset += path_len;
        }
    }

    // --- iteration ---

    /// Moves a sparse iterator to the next field within the same scope.
    pub(crate) fn sparse_iterator_move_next(&self, edit: &mut RowCursor) -> bool {
        if edit.cell_type.is_some() {
            // Move to the next element of an indexed scope.
            if edit.scope_type.is_indexed_scope() {
                edit.index += 1;
            }

            // Skip forward to the end of the current value.
            if edit.end_offset != 0 {
                edit.meta_offset = edit.end_offset;
                edit.end_offset = 0;
            } else {
                edit.meta_offset += self.sparse_compute_size(edit);
            }
        }

        if edit.meta_offset < self.length {
            // Check if reached the end of a sized scope.
            if !edit.scope_type.is_sized_scope() || edit.index != edit.count {
                self.read_sparse_metadata(edit);
                if !edit.cell_type.is_some_and(LayoutType::is_end_scope) {
                    edit.exists = true;
                    return true;
                }
            }
        }

        edit.cell_type = Some(&typ::END_SCOPE);
        edit.exists = false;
        edit.value_offset = edit.meta_offset;
        false
    }

    /// Produces a child cursor for the scope at the iterator's position.
    pub(crate) fn sparse_iterator_read_scope(
        &self,
        edit: &RowCursor,
        immutable: bool,
    ) -> RowCursor {
        let scope_type = edit.cell_type.expect("not positioned on a field");
        match scope_type.code().clear_immutable_bit() {
            LayoutCode::ObjectScope | LayoutCode::ArrayScope => RowCursor::new_scope(
                edit.layout.clone(),
                scope_type,
                edit.cell_type_args.clone(),
                edit.value_offset,
                edit.value_offset,
                edit.value_offset,
            )
            .with_immutable(immutable),

            LayoutCode::TypedArrayScope
            | LayoutCode::TypedSetScope
            | LayoutCode::TypedMapScope => {
                // Point past the element count.
                let value_offset = edit.value_offset + 4;
                RowCursor::new_scope(
                    edit.layout.clone(),
                    scope_type,
                    edit.cell_type_args.clone(),
                    edit.value_offset,
                    value_offset,
                    value_offset,
                )
                .with_immutable(immutable)
                .with_count(self.get_u32(edit.value_offset))
            }

            LayoutCode::TupleScope
            | LayoutCode::TypedTupleScope
            | LayoutCode::TaggedScope
            | LayoutCode::Tagged2Scope => RowCursor::new_scope(
                edit.layout.clone(),
                scope_type,
                edit.cell_type_args.clone(),
                edit.value_offset,
                edit.value_offset,
                edit.value_offset,
            )
            .with_immutable(immutable)
            .with_count(edit.cell_type_args.len() as u32),

            LayoutCode::NullableScope => {
                let has_value = self.get_i8(edit.value_offset) != 0;
                if has_value {
                    // Start at the value so it can be read.
                    let value_offset = edit.value_offset + 1;
                    RowCursor::new_scope(
                        edit.layout.clone(),
                        scope_type,
                        edit.cell_type_args.clone(),
                        edit.value_offset,
                        value_offset,
                        value_offset,
                    )
                    .with_immutable(immutable)
                    .with_count(2)
                    .with_index(1)
                } else {
                    // Start past the default value so it will be skipped.
                    let arg = &edit.cell_type_args[0];
                    let value_offset = edit.value_offset
                        + 1
                        + self.count_default_value(arg.layout_type(), arg.type_args());
                    RowCursor::new_scope(
                        edit.layout.clone(),
                        scope_type,
                        edit.cell_type_args.clone(),
                        edit.value_offset,
                        value_offset,
                        value_offset,
                    )
                    .with_immutable(immutable)
                    .with_count(2)
                    .with_index(2)
                }
            }

            LayoutCode::Schema => {
                let udt = self.resolver().resolve(edit.cell_type_args.schema_id());
                let value_offset =
                    self.compute_variable_value_offset(&udt, edit.value_offset, udt.num_variable());
                RowCursor::new_scope(
                    udt,
                    scope_type,
                    edit.cell_type_args.clone(),
                    edit.value_offset,
                    value_offset,
                    value_offset,
                )
                .with_immutable(immutable)
            }

            code => panic!("not a scope type: {code:?}"),
        }
    }

    /// Drains the scope and returns the offset immediately following it.
    pub(crate) fn skip_scope(&self, edit: &mut RowCursor) -> u32 {
        while self.sparse_iterator_move_next(edit) {}

        if !edit.scope_type.is_sized_scope() {
            // Move past the end-of-scope marker.
            edit.meta_offset += LayoutCode::WIRE_SIZE;
        }
        edit.meta_offset
    }

    // --- sizes ---

    /// The full encoded length of the field at the cursor, metadata
    /// included.
    pub(crate) fn sparse_compute_size(&self, edit: &RowCursor) -> u32 {
        let cell_type = edit.cell_type.expect("not positioned on a field");
        if !cell_type.is_scope() {
            return self.sparse_compute_primitive_size(
                cell_type,
                edit.meta_offset,
                edit.value_offset,
            );
        }

        let mut scope = self.sparse_iterator_read_scope(edit, true);
        self.skip_scope(&mut scope) - edit.meta_offset
    }

    /// The encoded length of a primitive field, metadata included.
    pub(crate) fn sparse_compute_primitive_size(
        &self,
        cell_type: &'static LayoutType,
        meta_offset: u32,
        value_offset: u32,
    ) -> u32 {
        let meta_bytes = value_offset - meta_offset;
        match cell_type.code() {
            LayoutCode::Null | LayoutCode::Boolean | LayoutCode::BooleanFalse => meta_bytes,
            LayoutCode::Utf8 | LayoutCode::Binary => {
                let (num_bytes, size_len) = self.get_varuint(value_offset);
                meta_bytes + size_len + num_bytes as u32
            }
            LayoutCode::VarInt | LayoutCode::VarUInt => {
                let (_, size_len) = self.get_varuint(value_offset);
                meta_bytes + size_len
            }
            code => {
                debug_assert!(!cell_type.is_scope(), "not a primitive: {code:?}");
                meta_bytes + cell_type.size()
            }
        }
    }

    // --- default values ---

    /// Size in bytes of the default sparse value for a type.
    pub(crate) fn count_default_value(
        &self,
        typ: &'static LayoutType,
        type_args: &TypeArgumentList,
    ) -> u32 {
        match typ.code().clear_immutable_bit() {
            // The value of nulls and booleans lives in the type code.
            LayoutCode::Null | LayoutCode::Boolean | LayoutCode::BooleanFalse => 1,

            // Variable-length types take one byte for a zero length prefix.
            LayoutCode::Utf8 | LayoutCode::Binary | LayoutCode::VarInt | LayoutCode::VarUInt => 1,

            // Untyped collections take one byte for the scope terminator.
            LayoutCode::ObjectScope | LayoutCode::ArrayScope => LayoutCode::WIRE_SIZE,

            // Sized typed collections take a zero element count.
            LayoutCode::TypedArrayScope
            | LayoutCode::TypedSetScope
            | LayoutCode::TypedMapScope => 4,

            // Fixed-arity untyped collections take one null per element
            // plus the terminator.
            LayoutCode::TupleScope => {
                LayoutCode::WIRE_SIZE + LayoutCode::WIRE_SIZE * type_args.len() as u32
            }

            // Fixed-arity typed collections take the default of each
            // element; the arity is implied by the type arguments.
            LayoutCode::TypedTupleScope | LayoutCode::TaggedScope | LayoutCode::Tagged2Scope => {
                type_args
                    .iter()
                    .map(|arg| self.count_default_value(arg.layout_type(), arg.type_args()))
                    .sum()
            }

            // Nullables take a has-value byte plus the default value.
            LayoutCode::NullableScope => {
                1 + self.count_default_value(
                    type_args[0].layout_type(),
                    type_args[0].type_args(),
                )
            }

            LayoutCode::Schema => {
                let udt = self.resolver().resolve(type_args.schema_id());
                udt.size() + LayoutCode::WIRE_SIZE
            }

            _ => typ.size(),
        }
    }

    /// Writes the default value of a type at `offset`; returns the bytes
    /// written.
    pub(crate) fn write_default_value(
        &mut self,
        offset: u32,
        typ: &'static LayoutType,
        type_args: &TypeArgumentList,
    ) -> u32 {
        match typ.code().clear_immutable_bit() {
            LayoutCode::Null => {
                self.write_sparse_type_code(offset, LayoutCode::Null);
                1
            }
            LayoutCode::Boolean | LayoutCode::BooleanFalse => {
                self.write_sparse_type_code(offset, LayoutCode::BooleanFalse);
                1
            }
            LayoutCode::Utf8 | LayoutCode::Binary | LayoutCode::VarInt | LayoutCode::VarUInt => {
                self.put_varuint(offset, 0)
            }
            LayoutCode::ObjectScope | LayoutCode::ArrayScope => {
                self.write_sparse_type_code(offset, LayoutCode::EndScope);
                LayoutCode::WIRE_SIZE
            }
            LayoutCode::TypedArrayScope
            | LayoutCode::TypedSetScope
            | LayoutCode::TypedMapScope => {
                self.put_u32(offset, 0);
                4
            }
            LayoutCode::TupleScope => {
                let mut len = 0;
                for _ in 0..type_args.len() {
                    self.write_sparse_type_code(offset + len, LayoutCode::Null);
                    len += LayoutCode::WIRE_SIZE;
                }
                self.write_sparse_type_code(offset + len, LayoutCode::EndScope);
                len + LayoutCode::WIRE_SIZE
            }
            LayoutCode::TypedTupleScope | LayoutCode::TaggedScope | LayoutCode::Tagged2Scope => {
                let mut len = 0;
                for arg in type_args {
                    len += self.write_default_value(offset + len, arg.layout_type(), arg.type_args());
                }
                len
            }
            LayoutCode::NullableScope => {
                self.put_i8(offset, 0);
                1 + self.write_default_value(
                    offset + 1,
                    type_args[0].layout_type(),
                    type_args[0].type_args(),
                )
            }
            LayoutCode::Schema => {
                let udt = self.resolver().resolve(type_args.schema_id());
                let udt_size = udt.size();
                self.buf[offset as usize..(offset + udt_size) as usize].fill(0);
                self.write_sparse_type_code(offset + udt_size, LayoutCode::EndScope);
                udt_size + LayoutCode::WIRE_SIZE
            }
            _ => {
                let size = typ.size();
                self.buf[offset as usize..(offset + size) as usize].fill(0);
                size
            }
        }
    }

    // --- write/read/delete preparation ---

    /// Checks that a sparse write at the cursor is permitted.
    pub(crate) fn prepare_sparse_write(
        &self,
        edit: &mut RowCursor,
        type_arg: &TypeArgument,
        options: UpdateOptions,
    ) -> Result<()> {
        if edit.immutable || (edit.scope_type.is_unique_scope() && !edit.defer_unique_index) {
            return Err(Error::InsufficientPermissions);
        }

        if edit.scope_type.is_fixed_arity() && !edit.scope_type.is_nullable_scope() {
            if (edit.index as usize) < edit.scope_type_args.len()
                && *type_arg != edit.scope_type_args[edit.index as usize]
            {
                return Err(Error::TypeConstraint);
            }
        } else if edit.scope_type.is_typed_map_scope() {
            if !(type_arg.layout_type().is_typed_tuple_scope()
                && *type_arg.type_args() == edit.scope_type_args)
            {
                return Err(Error::TypeConstraint);
            }
        } else if edit.scope_type.is_typed_scope() && *type_arg != edit.scope_type_args[0] {
            return Err(Error::TypeConstraint);
        }

        if options == UpdateOptions::InsertAt {
            if edit.scope_type.is_fixed_arity() {
                return Err(Error::TypeConstraint);
            }
            // InsertAt never overwrites an existing item.
            edit.exists = false;
        }

        if options == UpdateOptions::Update && !edit.exists {
            return Err(Error::NotFound);
        }

        if options == UpdateOptions::Insert && edit.exists {
            return Err(Error::Exists);
        }

        Ok(())
    }

    /// Checks that a sparse read at the cursor is permitted.
    pub(crate) fn prepare_sparse_read(&self, edit: &RowCursor, code: LayoutCode) -> Result<()> {
        if !edit.exists {
            return Err(Error::NotFound);
        }

        let cell = edit.cell_type.expect("existing field must have a type");
        if cell.code().canonicalize() != code {
            return Err(Error::TypeMismatch);
        }

        Ok(())
    }

    /// Checks that a sparse delete at the cursor is permitted.
    pub(crate) fn prepare_sparse_delete(&self, edit: &RowCursor, code: LayoutCode) -> Result<()> {
        if edit.scope_type.is_fixed_arity() {
            return Err(Error::TypeConstraint);
        }

        if edit.immutable {
            return Err(Error::InsufficientPermissions);
        }

        if edit.exists {
            let cell = edit.cell_type.expect("existing field must have a type");
            if cell.code().canonicalize() != code.canonicalize() {
                return Err(Error::TypeMismatch);
            }
        }

        Ok(())
    }

    /// Deletes the sparse field at the cursor.  Deleting a non-existent
    /// field is a no-op.
    pub fn delete_sparse(&mut self, edit: &mut RowCursor) -> Result<()> {
        if let Some(cell) = edit.cell_type {
            self.prepare_sparse_delete(edit, cell.code())?;
        } else if edit.scope_type.is_fixed_arity() {
            return Err(Error::TypeConstraint);
        } else if edit.immutable {
            return Err(Error::InsufficientPermissions);
        }
        self.delete_sparse_unchecked(edit);
        Ok(())
    }

    pub(crate) fn delete_sparse_unchecked(&mut self, edit: &mut RowCursor) {
        if !edit.exists {
            return;
        }
        let cell_type = edit.cell_type.expect("existing field must have a type");
        let args = edit.cell_type_args.clone();
        let (_, _, shift) = self.ensure_sparse(edit, cell_type, &args, 0, RowOptions::Delete);
        self.apply_shift(shift);
    }
}
