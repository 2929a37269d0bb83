//! Unique scopes: binary collation, move-into-scope, and index rebuild.

use super::buffer::RowBuffer;
use super::cursor::RowCursor;
use super::options::{RowOptions, UpdateOptions};
use crate::error::{Error, Result};
use crate::layout::{LayoutCode, LayoutType, typ};

/// A single element of a set/map scope recorded for indexing.
#[derive(Clone, Copy)]
struct UniqueIndexItem {
    code: LayoutCode,
    meta_offset: u32,
    value_offset: u32,
    size: u32,
}

impl RowBuffer {
    /// Moves a staged field into a unique scope, maintaining collation
    /// order and uniqueness.
    ///
    /// The source field is deleted whether or not the move succeeds; on a
    /// destination error the staged value would otherwise be left dangling
    /// in the row.
    pub fn move_field(
        &mut self,
        dest_scope: &mut RowCursor,
        src_edit: &mut RowCursor,
        options: UpdateOptions,
    ) -> Result<()> {
        let mut dst_edit = self.prepare_unique_move(dest_scope, src_edit, options)?;

        // Perform the move.
        self.typed_collection_move_field(&mut dst_edit, src_edit, options.into());
        dest_scope.count = dst_edit.count;
        Ok(())
    }

    /// Searches a unique scope for an element matching the staged pattern.
    ///
    /// The pattern field is consumed whether or not the find succeeds.  On
    /// success returns a cursor positioned on the matching element.
    pub fn find_in_unique_scope(
        &mut self,
        scope: &RowCursor,
        pattern_scope: &mut RowCursor,
    ) -> Result<RowCursor> {
        let value = self.prepare_unique_move(scope, pattern_scope, UpdateOptions::Update)?;
        self.delete_sparse_unchecked(pattern_scope);
        Ok(value)
    }

    /// Validates a move into a unique scope and locates the insertion (or
    /// match) position.
    fn prepare_unique_move(
        &mut self,
        dest_scope: &RowCursor,
        src_edit: &mut RowCursor,
        options: UpdateOptions,
    ) -> Result<RowCursor> {
        assert!(dest_scope.scope_type.is_unique_scope());
        assert_eq!(dest_scope.index, 0, "can only insert into a scope at the root");
        let element_type = dest_scope.scope_type.field_type(dest_scope);

        self.prepare_sparse_delete(src_edit, element_type.layout_type().code())?;

        if !src_edit.exists {
            return Err(Error::NotFound);
        }

        if dest_scope.immutable {
            self.delete_sparse_unchecked(src_edit);
            return Err(Error::InsufficientPermissions);
        }

        if src_edit.cell_type_args != *element_type.type_args() {
            self.delete_sparse_unchecked(src_edit);
            return Err(Error::TypeConstraint);
        }

        if options == UpdateOptions::InsertAt {
            self.delete_sparse_unchecked(src_edit);
            return Err(Error::TypeConstraint);
        }

        let dst_edit = self.prepare_sparse_move(dest_scope, src_edit);
        if options == UpdateOptions::Update && !dst_edit.exists {
            self.delete_sparse_unchecked(src_edit);
            return Err(Error::NotFound);
        }

        if options == UpdateOptions::Insert && dst_edit.exists {
            self.delete_sparse_unchecked(src_edit);
            return Err(Error::Exists);
        }

        Ok(dst_edit)
    }

    /// Walks a unique scope in collation order to find where the source
    /// field belongs.  The returned cursor has `exists` set on an exact
    /// match, otherwise it points at the insertion slot.
    pub(crate) fn prepare_sparse_move(
        &self,
        scope: &RowCursor,
        src_edit: &RowCursor,
    ) -> RowCursor {
        assert!(scope.scope_type.is_unique_scope());
        assert_eq!(scope.index, 0);

        let mut dst_edit = scope.clone();
        dst_edit.meta_offset = scope.value_offset;

        let src_size = self.sparse_compute_size(src_edit);
        let src_bytes = src_size - (src_edit.value_offset - src_edit.meta_offset);
        while dst_edit.index < dst_edit.count {
            self.read_sparse_metadata(&mut dst_edit);
            debug_assert_eq!(dst_edit.path_offset, 0);

            // Defer computing the full element size until needed.
            let mut elm_size = None;
            let cmp = if scope.scope_type.is_typed_map_scope() {
                self.compare_key_value_field_value(src_edit, &dst_edit)
            } else {
                let size = self.sparse_compute_size(&dst_edit);
                elm_size = Some(size);
                let elm_bytes = size - (dst_edit.value_offset - dst_edit.meta_offset);
                self.compare_field_value(src_edit, src_bytes, &dst_edit, elm_bytes)
            };

            if cmp <= 0 {
                dst_edit.exists = cmp == 0;
                return dst_edit;
            }

            let elm_size = elm_size.unwrap_or_else(|| self.sparse_compute_size(&dst_edit));
            dst_edit.index += 1;
            dst_edit.meta_offset += elm_size;
        }

        dst_edit.exists = false;
        dst_edit.cell_type = Some(&typ::END_SCOPE);
        dst_edit.value_offset = dst_edit.meta_offset;
        dst_edit
    }

    /// Copies the source field's value into the destination slot, then
    /// deletes the source.
    pub(crate) fn typed_collection_move_field(
        &mut self,
        dst_edit: &mut RowCursor,
        src_edit: &mut RowCursor,
        options: RowOptions,
    ) {
        let encoded_size = self.sparse_compute_size(src_edit);
        let num_bytes = encoded_size - (src_edit.value_offset - src_edit.meta_offset);
        let cell_type = src_edit.cell_type.expect("source must exist");
        let cell_type_args = src_edit.cell_type_args.clone();

        // Insert the field metadata into its new location.
        let (meta_bytes, space_needed, shift_insert) =
            self.ensure_sparse(dst_edit, cell_type, &cell_type_args, num_bytes, options);
        self.write_sparse_metadata(dst_edit, cell_type, &cell_type_args, meta_bytes);
        debug_assert_eq!(space_needed, meta_bytes + num_bytes);
        if src_edit.meta_offset >= dst_edit.meta_offset {
            src_edit.meta_offset = src_edit.meta_offset.wrapping_add_signed(shift_insert);
            src_edit.value_offset = src_edit.value_offset.wrapping_add_signed(shift_insert);
        }

        // Copy the value bits from the old location.
        let src = src_edit.value_offset as usize;
        let dst = dst_edit.value_offset as usize;
        self.buf.copy_within(src..src + num_bytes as usize, dst);
        self.apply_shift(shift_insert);

        // Delete the old location.
        let (_, _, shift_delete) =
            self.ensure_sparse(src_edit, cell_type, &cell_type_args, num_bytes, RowOptions::Delete);
        debug_assert!(shift_delete < 0);
        self.apply_shift(shift_delete);
    }

    /// Rebuilds the unique index of a set/map scope.
    ///
    /// The scope may have been bulk-loaded with uniqueness checking
    /// deferred.  Elements are sorted into collation order; if a duplicate
    /// exists the operation fails with `Exists` and the row keeps its
    /// current (sorted-but-duplicated) content — delete the duplicates and
    /// rebuild again, or delete the entire scope, before any further
    /// partial updates.
    ///
    /// The operation is idempotent.
    pub fn unique_index_rebuild(&mut self, scope: &mut RowCursor) -> Result<()> {
        assert!(scope.scope_type.is_unique_scope());
        assert_eq!(scope.index, 0);
        let mut dst_edit = scope.clone();
        if dst_edit.count <= 1 {
            return Ok(());
        }

        // Record each element's offsets and length.
        let mut unique_index = Vec::with_capacity(dst_edit.count as usize);
        dst_edit.meta_offset = scope.value_offset;
        while dst_edit.index < dst_edit.count {
            self.read_sparse_metadata(&mut dst_edit);
            debug_assert_eq!(dst_edit.path_offset, 0);
            let elm_size = self.sparse_compute_size(&dst_edit);
            unique_index.push(UniqueIndexItem {
                code: dst_edit.cell_type.expect("element must have a type").code(),
                meta_offset: dst_edit.meta_offset,
                value_offset: dst_edit.value_offset,
                size: elm_size,
            });
            dst_edit.meta_offset += elm_size;
            dst_edit.index += 1;
        }

        // Scratch space at the tail equal to the sum of the element sizes:
        // with scratch, each element moves at most once.
        let shift = dst_edit.meta_offset - scope.value_offset;

        if !self.insertion_sort(scope, &dst_edit, &mut unique_index) {
            return Err(Error::Exists);
        }

        // Move elements through the scratch region in sorted order.
        let mut meta_offset = scope.value_offset;
        self.ensure(self.length + shift);
        let tail = (self.length - meta_offset) as usize;
        self.buf.copy_within(
            meta_offset as usize..meta_offset as usize + tail,
            (meta_offset + shift) as usize,
        );
        for x in &unique_index {
            let src = (x.meta_offset + shift) as usize;
            self.buf.copy_within(src..src + x.size as usize, meta_offset as usize);
            meta_offset += x.size;
        }

        // Close the gap to the scratch region unless it falls off the end
        // of the row.
        if meta_offset != self.length {
            let src = (meta_offset + shift) as usize;
            let rest = (self.length - meta_offset) as usize;
            self.buf.copy_within(src..src + rest, meta_offset as usize);
        }

        #[cfg(debug_assertions)]
        {
            let start = self.length as usize;
            self.buf[start..start + shift as usize].fill(0xFF);
        }

        Ok(())
    }

    /// Sorts the index items by collation order.
    ///
    /// Returns false if a duplicate was found.  Insertion sort guarantees
    /// every element is eventually compared against its predecessor in
    /// sorted order, so at least one duplicate is always detected in a
    /// single pass; algorithms without that property would need a separate
    /// duplicate sweep.
    fn insertion_sort(
        &self,
        scope: &RowCursor,
        dst_edit: &RowCursor,
        unique_index: &mut [UniqueIndexItem],
    ) -> bool {
        let mut left_edit = dst_edit.clone();
        let mut right_edit = dst_edit.clone();

        for i in 1..unique_index.len() {
            let x = unique_index[i];
            left_edit.cell_type = Some(typ::from_code(x.code));
            left_edit.meta_offset = x.meta_offset;
            left_edit.value_offset = x.value_offset;
            let left_bytes = x.size - (x.value_offset - x.meta_offset);

            // Walk backwards searching for the insertion point of item i.
            let mut j = i as isize - 1;
            while j >= 0 {
                let y = unique_index[j as usize];
                right_edit.cell_type = Some(typ::from_code(y.code));
                right_edit.meta_offset = y.meta_offset;
                right_edit.value_offset = y.value_offset;

                let cmp = if scope.scope_type.is_typed_map_scope() {
                    self.compare_key_value_field_value(&left_edit, &right_edit)
                } else {
                    let right_bytes = y.size - (y.value_offset - y.meta_offset);
                    self.compare_field_value(&left_edit, left_bytes, &right_edit, right_bytes)
                };

                if cmp == 0 {
                    return false;
                }

                if cmp > 0 {
                    break;
                }

                unique_index[j as usize + 1] = unique_index[j as usize];
                j -= 1;
            }

            unique_index[(j + 1) as usize] = x;
        }

        true
    }

    /// Three-way binary collation over two encoded fields: by type code
    /// first, then shorter-value-first, then bytewise.
    pub(crate) fn compare_field_value(
        &self,
        left: &RowCursor,
        left_len: u32,
        right: &RowCursor,
        right_len: u32,
    ) -> i32 {
        let left_type = left.cell_type.expect("left must exist");
        let right_type = right.cell_type.expect("right must exist");
        if left_type.code() < right_type.code() {
            return -1;
        }

        if left_type.code() == right_type.code() {
            if left_len < right_len {
                return -1;
            }

            if left_len == right_len {
                let l = &self.buf[left.value_offset as usize..(left.value_offset + left_len) as usize];
                let r =
                    &self.buf[right.value_offset as usize..(right.value_offset + right_len) as usize];
                return match l.cmp(r) {
                    std::cmp::Ordering::Less => -1,
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 1,
                };
            }
        }

        1
    }

    /// Collation over two key/value pair fields comparing only the keys.
    pub(crate) fn compare_key_value_field_value(
        &self,
        left: &RowCursor,
        right: &RowCursor,
    ) -> i32 {
        let left_type = left.cell_type.expect("left must exist");
        let right_type = right.cell_type.expect("right must exist");
        assert!(left_type.is_typed_tuple_scope());
        assert!(right_type.is_typed_tuple_scope());
        assert_eq!(left.cell_type_args.len(), 2);
        assert_eq!(left.cell_type_args, right.cell_type_args);

        let left_key = self.pair_key_edit(left, left_type);
        let left_key_len =
            self.sparse_compute_size(&left_key) - (left_key.value_offset - left_key.meta_offset);

        let right_key = self.pair_key_edit(right, right_type);
        let right_key_len =
            self.sparse_compute_size(&right_key) - (right_key.value_offset - right_key.meta_offset);

        self.compare_field_value(&left_key, left_key_len, &right_key, right_key_len)
    }

    /// A transient cursor positioned on the key (first element) of a pair
    /// tuple.
    fn pair_key_edit(&self, pair: &RowCursor, pair_type: &'static LayoutType) -> RowCursor {
        let mut key = RowCursor::new_scope(
            pair.layout.clone(),
            pair_type,
            pair.cell_type_args.clone(),
            pair.value_offset,
            pair.value_offset,
            0,
        );
        self.read_sparse_metadata(&mut key);
        debug_assert_eq!(key.path_offset, 0);
        key
    }
}
