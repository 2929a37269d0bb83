//! Opening, reading, and deleting nested scopes.

use super::buffer::RowBuffer;
use super::cursor::RowCursor;
use super::options::UpdateOptions;
use crate::error::{Error, Result};
use crate::layout::{LayoutCode, LayoutType, TypeArgument, TypeArgumentList};

impl RowBuffer {
    /// Writes a new scope at the cursor and returns a child cursor
    /// positioned at the scope's first element slot.
    ///
    /// Typed fixed-arity scopes (typed tuples, tagged scopes) and nullables
    /// are seeded with default element values so the scope is traversable
    /// before its elements are overwritten.  For nullable scopes this
    /// overload writes `has_value = true`; use
    /// [`RowBuffer::write_nullable_scope`] to control the flag.
    pub fn write_scope(
        &mut self,
        edit: &mut RowCursor,
        scope_type: &'static LayoutType,
        type_args: TypeArgumentList,
        options: UpdateOptions,
    ) -> Result<RowCursor> {
        match scope_type.code().clear_immutable_bit() {
            LayoutCode::ObjectScope | LayoutCode::ArrayScope => {
                self.prepare_sparse_write(edit, &TypeArgument::of(scope_type), options)?;
                Ok(self.write_untyped_scope(edit, scope_type, options))
            }
            LayoutCode::TypedArrayScope
            | LayoutCode::TypedSetScope
            | LayoutCode::TypedMapScope => {
                self.prepare_sparse_write(
                    edit,
                    &TypeArgument::new(scope_type, type_args.clone()),
                    options,
                )?;
                Ok(self.write_sized_scope(edit, scope_type, type_args, options))
            }
            LayoutCode::TupleScope => {
                self.prepare_sparse_write(
                    edit,
                    &TypeArgument::new(scope_type, type_args.clone()),
                    options,
                )?;
                Ok(self.write_sparse_tuple(edit, scope_type, type_args, options))
            }
            LayoutCode::TypedTupleScope | LayoutCode::TaggedScope | LayoutCode::Tagged2Scope => {
                self.prepare_sparse_write(
                    edit,
                    &TypeArgument::new(scope_type, type_args.clone()),
                    options,
                )?;
                Ok(self.write_typed_tuple(edit, scope_type, type_args, options))
            }
            LayoutCode::NullableScope => {
                self.write_nullable_scope(edit, scope_type, type_args, true, options)
            }
            LayoutCode::Schema => {
                self.prepare_sparse_write(
                    edit,
                    &TypeArgument::new(scope_type, type_args.clone()),
                    options,
                )?;
                Ok(self.write_sparse_udt(edit, scope_type, type_args, options))
            }
            code => panic!("not a writable scope type: {code:?}"),
        }
    }

    /// Writes a nullable scope with an explicit has-value flag.
    ///
    /// Even when `has_value` is false the scope body carries a
    /// default-valued element so that iteration and skipping stay
    /// symmetric with other fixed-arity scopes.
    pub fn write_nullable_scope(
        &mut self,
        edit: &mut RowCursor,
        scope_type: &'static LayoutType,
        type_args: TypeArgumentList,
        has_value: bool,
        options: UpdateOptions,
    ) -> Result<RowCursor> {
        assert!(scope_type.is_nullable_scope());
        self.prepare_sparse_write(
            edit,
            &TypeArgument::new(scope_type, type_args.clone()),
            options,
        )?;

        let num_bytes = self.count_default_value(scope_type, &type_args);
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, scope_type, &type_args, num_bytes, options.into());
        self.write_sparse_metadata(edit, scope_type, &type_args, meta_bytes);
        let num_written = self.write_default_value(edit.value_offset, scope_type, &type_args);
        debug_assert_eq!(num_bytes, num_written);
        debug_assert_eq!(space_needed, meta_bytes + num_bytes);
        if has_value {
            self.put_i8(edit.value_offset, 1);
        }

        self.apply_shift(shift);
        let value_offset = edit.value_offset + 1;
        let mut scope = RowCursor::new_scope(
            edit.layout.clone(),
            scope_type,
            edit.cell_type_args.clone(),
            edit.value_offset,
            value_offset,
            value_offset,
        )
        .with_count(2)
        .with_index(1);
        scope.move_next(self);
        Ok(scope)
    }

    /// Reports whether a nullable scope currently holds a value.
    pub fn nullable_has_value(&self, scope: &RowCursor) -> Result<()> {
        assert!(scope.scope_type.is_nullable_scope());
        debug_assert!(
            scope.index == 1 || scope.index == 2,
            "nullable scopes always point at the value"
        );
        debug_assert_eq!(scope.scope_type_args.len(), 1);

        if self.get_i8(scope.start) != 0 {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    /// Produces a child cursor for reading the scope at the cursor.
    ///
    /// The child is read-only if the scope type is immutable, the parent is
    /// read-only, or the parent is a unique scope.
    pub fn read_scope(&self, edit: &RowCursor) -> Result<RowCursor> {
        if !edit.exists {
            return Err(Error::NotFound);
        }
        let cell = edit.cell_type.expect("existing field must have a type");
        if !cell.is_scope() {
            return Err(Error::TypeMismatch);
        }

        let immutable = cell.is_immutable() || edit.immutable || edit.scope_type.is_unique_scope();
        Ok(self.sparse_iterator_read_scope(edit, immutable))
    }

    /// Deletes the scope at the cursor, including all of its items.
    pub fn delete_scope(&mut self, edit: &mut RowCursor) -> Result<()> {
        self.delete_sparse(edit)
    }

    // --- scope body writers ---

    /// Object and array scopes: no size prefix, terminated by `EndScope`.
    fn write_untyped_scope(
        &mut self,
        edit: &mut RowCursor,
        scope_type: &'static LayoutType,
        options: UpdateOptions,
    ) -> RowCursor {
        let num_bytes = LayoutCode::WIRE_SIZE;
        let type_args = TypeArgumentList::default();
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, scope_type, &type_args, num_bytes, options.into());
        self.write_sparse_metadata(edit, scope_type, &type_args, meta_bytes);
        self.write_sparse_type_code(edit.value_offset, LayoutCode::EndScope);
        debug_assert_eq!(space_needed, meta_bytes + num_bytes);
        self.apply_shift(shift);
        RowCursor::new_scope(
            edit.layout.clone(),
            scope_type,
            type_args,
            edit.value_offset,
            edit.value_offset,
            edit.value_offset,
        )
    }

    /// Typed array/set/map scopes: a 4-byte element count precedes the
    /// body; no terminator.
    fn write_sized_scope(
        &mut self,
        edit: &mut RowCursor,
        scope_type: &'static LayoutType,
        type_args: TypeArgumentList,
        options: UpdateOptions,
    ) -> RowCursor {
        let num_bytes = 4;
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, scope_type, &type_args, num_bytes, options.into());
        self.write_sparse_metadata(edit, scope_type, &type_args, meta_bytes);
        debug_assert_eq!(space_needed, meta_bytes + num_bytes);
        self.put_u32(edit.value_offset, 0);
        // The scope start points at the count; elements begin after it.
        let value_offset = edit.value_offset + 4;
        self.apply_shift(shift);
        RowCursor::new_scope(
            edit.layout.clone(),
            scope_type,
            type_args,
            edit.value_offset,
            value_offset,
            value_offset,
        )
    }

    /// Untyped tuple scopes: null placeholders for each element, then an
    /// `EndScope` terminator.
    fn write_sparse_tuple(
        &mut self,
        edit: &mut RowCursor,
        scope_type: &'static LayoutType,
        type_args: TypeArgumentList,
        options: UpdateOptions,
    ) -> RowCursor {
        let arity = type_args.len() as u32;
        let num_bytes = LayoutCode::WIRE_SIZE * (1 + arity);
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, scope_type, &type_args, num_bytes, options.into());
        self.write_sparse_metadata(edit, scope_type, &type_args, meta_bytes);
        let mut value_offset = edit.value_offset;
        for _ in 0..arity {
            self.write_sparse_type_code(value_offset, LayoutCode::Null);
            value_offset += LayoutCode::WIRE_SIZE;
        }
        self.write_sparse_type_code(value_offset, LayoutCode::EndScope);
        debug_assert_eq!(space_needed, meta_bytes + num_bytes);
        self.apply_shift(shift);
        RowCursor::new_scope(
            edit.layout.clone(),
            scope_type,
            type_args,
            edit.value_offset,
            edit.value_offset,
            edit.value_offset,
        )
        .with_count(arity)
    }

    /// Typed tuple and tagged scopes: fixed arity, implicitly typed
    /// elements seeded with default values; no terminator.
    fn write_typed_tuple(
        &mut self,
        edit: &mut RowCursor,
        scope_type: &'static LayoutType,
        type_args: TypeArgumentList,
        options: UpdateOptions,
    ) -> RowCursor {
        let num_bytes = self.count_default_value(scope_type, &type_args);
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, scope_type, &type_args, num_bytes, options.into());
        self.write_sparse_metadata(edit, scope_type, &type_args, meta_bytes);
        let num_written = self.write_default_value(edit.value_offset, scope_type, &type_args);
        debug_assert_eq!(num_bytes, num_written);
        debug_assert_eq!(space_needed, meta_bytes + num_bytes);
        self.apply_shift(shift);

        let mut scope = RowCursor::new_scope(
            edit.layout.clone(),
            scope_type,
            type_args.clone(),
            edit.value_offset,
            edit.value_offset,
            edit.value_offset,
        )
        .with_count(type_args.len() as u32);
        scope.move_next(self);
        scope
    }

    /// UDT scopes: an entire embedded layout region, zeroed, followed by an
    /// `EndScope` terminator.
    fn write_sparse_udt(
        &mut self,
        edit: &mut RowCursor,
        scope_type: &'static LayoutType,
        type_args: TypeArgumentList,
        options: UpdateOptions,
    ) -> RowCursor {
        let udt = self.resolver().resolve(type_args.schema_id());
        let num_bytes = udt.size() + LayoutCode::WIRE_SIZE;
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, scope_type, &type_args, num_bytes, options.into());
        self.write_sparse_metadata(edit, scope_type, &type_args, meta_bytes);

        // Clear the embedded bitmask and fixed region.
        let start = edit.value_offset as usize;
        self.buf[start..start + udt.size() as usize].fill(0);

        let value_offset = edit.value_offset + udt.size();
        self.write_sparse_type_code(value_offset, LayoutCode::EndScope);
        debug_assert_eq!(space_needed, meta_bytes + num_bytes);
        self.apply_shift(shift);
        RowCursor::new_scope(
            udt,
            scope_type,
            type_args,
            edit.value_offset,
            value_offset,
            value_offset,
        )
    }
}
