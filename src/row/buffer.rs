//! The mutable byte container for a hybrid row.

use std::sync::Arc;

use super::cursor::RowCursor;
use super::header::{HybridRowHeader, HybridRowVersion};
use crate::codec;
use crate::error::{Error, Result};
use crate::layout::{Layout, LayoutBit, LayoutColumn, LayoutResolver};
use crate::schema::SchemaId;
use crate::types::{DateTime, Decimal, Float128, Guid, MongoObjectId, UnixDateTime};

/// An in-memory hybrid row: a growable byte buffer plus the encode/decode
/// engine for every column storage class.
///
/// A row begins at byte 0 of the buffer; the remaining byte sequence is
/// defined by the hybrid row grammar.  One `RowBuffer` and all cursors
/// derived from it form a single ownership domain: mutating through one
/// cursor invalidates every other cursor into the same row.
pub struct RowBuffer {
    pub(crate) buf: Vec<u8>,
    pub(crate) length: u32,
    pub(crate) resolver: Option<Arc<dyn LayoutResolver>>,
}

impl RowBuffer {
    /// Creates an empty row buffer with the given initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> RowBuffer {
        RowBuffer {
            buf: vec![0; capacity],
            length: 0,
            resolver: None,
        }
    }

    /// Creates an empty row buffer.
    #[must_use]
    pub fn new() -> RowBuffer {
        RowBuffer::with_capacity(0)
    }

    /// The root header of the row.
    #[must_use]
    pub fn header(&self) -> HybridRowHeader {
        self.read_header(0)
    }

    /// The length of the row in bytes.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// The full encoded content of the row.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.length as usize]
    }

    /// The resolver for UDTs.
    ///
    /// # Panics
    /// Panics if the row has not been initialized.
    #[must_use]
    pub fn resolver(&self) -> &Arc<dyn LayoutResolver> {
        self.resolver.as_ref().expect("row buffer not initialized")
    }

    /// Clears all content from the row.  The row is empty after this.
    pub fn reset(&mut self) {
        self.length = 0;
        self.resolver = None;
    }

    /// Initializes a row to the minimal size for the given layout.
    ///
    /// All fixed columns have their default values, all variable columns
    /// are null, and no sparse fields are present.
    pub fn init_layout(
        &mut self,
        version: HybridRowVersion,
        layout: &Layout,
        resolver: Arc<dyn LayoutResolver>,
    ) {
        self.resolver = Some(resolver);

        // Space for the header plus the fixed schematized region.
        self.ensure(HybridRowHeader::SIZE + layout.size());
        self.length = HybridRowHeader::SIZE + layout.size();

        // Clear all presence bits.
        self.buf[HybridRowHeader::SIZE as usize..self.length as usize].fill(0);

        self.write_header(0, HybridRowHeader::new(version, layout.schema_id()));
    }

    /// Reads the row content from an existing block of memory.
    ///
    /// Returns false if the input cannot be a row of the expected version.
    pub fn read_from(
        &mut self,
        input: &[u8],
        version: HybridRowVersion,
        resolver: Arc<dyn LayoutResolver>,
    ) -> bool {
        let bytes_count = input.len() as u32;
        debug_assert!(bytes_count >= HybridRowHeader::SIZE);

        self.reset();
        self.resolver = Some(resolver);
        self.ensure(bytes_count);
        self.buf[..input.len()].copy_from_slice(input);
        self.length = bytes_count;
        self.init_read_from(version)
    }

    fn init_read_from(&self, version: HybridRowVersion) -> bool {
        let header = self.read_header(0);
        let layout = self.resolver().resolve(header.schema_id());
        debug_assert_eq!(header.schema_id(), layout.schema_id());
        header.version() == version && HybridRowHeader::SIZE + layout.size() <= self.length
    }

    /// Ensures at least `size` bytes of backing storage.
    pub(crate) fn ensure(&mut self, size: u32) {
        if self.buf.len() < size as usize {
            let grown = (self.buf.len() * 2).max(size as usize);
            self.buf.resize(grown, 0);
        }
    }

    pub(crate) fn apply_shift(&mut self, shift: i32) {
        self.length = self.length.checked_add_signed(shift).expect("row length underflow");
    }

    // --- header ---

    pub(crate) fn write_header(&mut self, offset: u32, value: HybridRowHeader) {
        self.put_u8(offset, value.version() as u8);
        self.write_schema_id(offset + 1, value.schema_id());
    }

    pub(crate) fn read_header(&self, offset: u32) -> HybridRowHeader {
        HybridRowHeader::new(
            HybridRowVersion::from_u8(self.get_u8(offset)),
            self.read_schema_id(offset + 1),
        )
    }

    pub(crate) fn write_schema_id(&mut self, offset: u32, value: SchemaId) {
        self.put_i32(offset, value.id());
    }

    pub(crate) fn read_schema_id(&self, offset: u32) -> SchemaId {
        SchemaId::new(self.get_i32(offset))
    }

    // --- bitmask ---

    /// Sets a presence/boolean bit.  Setting the invalid bit is a no-op:
    /// non-nullable fields have no presence bit and are always present.
    pub(crate) fn set_bit(&mut self, offset: u32, bit: LayoutBit) {
        if bit.is_invalid() {
            return;
        }
        self.buf[bit.offset(offset) as usize] |= 1 << bit.bit();
    }

    pub(crate) fn unset_bit(&mut self, offset: u32, bit: LayoutBit) {
        debug_assert!(!bit.is_invalid());
        self.buf[bit.offset(offset) as usize] &= !(1u8 << bit.bit());
    }

    /// Reads a presence/boolean bit.  The invalid bit reads as true: fields
    /// without a presence bit are always present.
    pub(crate) fn read_bit(&self, offset: u32, bit: LayoutBit) -> bool {
        if bit.is_invalid() {
            return true;
        }
        self.buf[bit.offset(offset) as usize] & (1 << bit.bit()) != 0
    }

    // --- raw little-endian scalars ---

    pub(crate) fn put_u8(&mut self, offset: u32, value: u8) {
        self.buf[offset as usize] = value;
    }

    pub(crate) fn get_u8(&self, offset: u32) -> u8 {
        self.buf[offset as usize]
    }

    pub(crate) fn put_i8(&mut self, offset: u32, value: i8) {
        self.buf[offset as usize] = value as u8;
    }

    pub(crate) fn get_i8(&self, offset: u32) -> i8 {
        self.buf[offset as usize] as i8
    }

    pub(crate) fn increment_u32(&mut self, offset: u32, increment: u32) {
        let value = self.get_u32(offset).wrapping_add(increment);
        self.put_u32(offset, value);
    }

    pub(crate) fn decrement_u32(&mut self, offset: u32, decrement: u32) {
        let value = self.get_u32(offset).wrapping_sub(decrement);
        self.put_u32(offset, value);
    }

    // --- varints ---

    pub(crate) fn put_varuint(&mut self, offset: u32, value: u64) -> u32 {
        codec::write_varuint(&mut self.buf, offset as usize, value)
    }

    pub(crate) fn get_varuint(&self, offset: u32) -> (u64, u32) {
        codec::read_varuint(&self.buf, offset as usize)
    }

    pub(crate) fn put_varint(&mut self, offset: u32, value: i64) -> u32 {
        codec::write_varint(&mut self.buf, offset as usize, value)
    }

    pub(crate) fn get_varint(&self, offset: u32) -> (i64, u32) {
        codec::read_varint(&self.buf, offset as usize)
    }

    // --- length-prefixed strings and binary ---

    /// Reads a length-prefixed UTF-8 string; returns the value and the size
    /// of the length prefix.
    pub(crate) fn read_string(&self, offset: u32) -> (&str, u32) {
        let (num_bytes, size_len) = self.get_varuint(offset);
        let start = (offset + size_len) as usize;
        let bytes = &self.buf[start..start + num_bytes as usize];
        (
            std::str::from_utf8(bytes).expect("row contains invalid utf8"),
            size_len,
        )
    }

    /// Writes a length-prefixed UTF-8 string; returns the size of the
    /// length prefix.
    pub(crate) fn write_string(&mut self, offset: u32, value: &str) -> u32 {
        let size_len = self.put_varuint(offset, value.len() as u64);
        let start = (offset + size_len) as usize;
        self.buf[start..start + value.len()].copy_from_slice(value.as_bytes());
        size_len
    }

    /// Reads a length-prefixed byte string; returns the value and the size
    /// of the length prefix.
    pub(crate) fn read_binary(&self, offset: u32) -> (&[u8], u32) {
        let (num_bytes, size_len) = self.get_varuint(offset);
        let start = (offset + size_len) as usize;
        (&self.buf[start..start + num_bytes as usize], size_len)
    }

    /// Writes a length-prefixed byte string; returns the size of the length
    /// prefix.
    pub(crate) fn write_binary(&mut self, offset: u32, value: &[u8]) -> u32 {
        let size_len = self.put_varuint(offset, value.len() as u64);
        let start = (offset + size_len) as usize;
        self.buf[start..start + value.len()].copy_from_slice(value);
        size_len
    }

    pub(crate) fn read_fixed_string_raw(&self, offset: u32, len: u32) -> &str {
        let bytes = &self.buf[offset as usize..(offset + len) as usize];
        std::str::from_utf8(bytes).expect("row contains invalid utf8")
    }

    pub(crate) fn write_fixed_string_raw(&mut self, offset: u32, value: &str) {
        let start = offset as usize;
        self.buf[start..start + value.len()].copy_from_slice(value.as_bytes());
    }

    pub(crate) fn read_fixed_binary_raw(&self, offset: u32, len: u32) -> &[u8] {
        &self.buf[offset as usize..(offset + len) as usize]
    }

    /// Writes fixed-length binary, zero-padding up to `len` if the value is
    /// shorter.
    pub(crate) fn write_fixed_binary_raw(&mut self, offset: u32, value: &[u8], len: u32) {
        let start = offset as usize;
        self.buf[start..start + value.len()].copy_from_slice(value);
        if value.len() < len as usize {
            self.buf[start + value.len()..start + len as usize].fill(0);
        }
    }

    // --- variable-length segment ---

    /// Computes the byte offset from the beginning of the row of a variable
    /// column's value by walking the presence bits and length prefixes of
    /// every earlier variable column.
    pub(crate) fn compute_variable_value_offset(
        &self,
        layout: &Layout,
        scope_offset: u32,
        var_index: u32,
    ) -> u32 {
        let index = layout.num_fixed() + var_index;
        let columns = layout.columns();
        debug_assert!(index as usize <= columns.len());
        let mut offset = scope_offset + layout.size();
        for col in &columns[layout.num_fixed() as usize..index as usize] {
            if self.read_bit(scope_offset, col.null_bit()) {
                let (value_size, length_size) = self.get_varuint(offset);
                if col.layout_type().is_varint() {
                    offset += length_size;
                } else {
                    offset += value_size as u32 + length_size;
                }
            }
        }
        offset
    }

    /// Makes room for a variable value of `num_bytes` at `offset`, shifting
    /// the remainder of the row.  Returns the space needed and the shift
    /// applied (may be negative).
    pub(crate) fn ensure_variable(
        &mut self,
        offset: u32,
        is_varint: bool,
        num_bytes: u32,
        exists: bool,
    ) -> (u32, i32) {
        let mut space_available = 0;
        let mut existing_value_bytes = 0;
        if exists {
            (existing_value_bytes, space_available) = self.get_varuint(offset);
        }

        let space_needed = if is_varint {
            num_bytes
        } else {
            // Size prefix already counted in space_available.
            space_available += existing_value_bytes as u32;
            num_bytes + codec::count_varuint(u64::from(num_bytes))
        };

        let shift = space_needed as i32 - space_available as i32;
        if shift > 0 {
            self.ensure(self.length + shift as u32);
        }
        let src = (offset + space_available) as usize;
        let dst = (offset + space_needed) as usize;
        let tail = (self.length - (offset + space_available)) as usize;
        self.buf.copy_within(src..src + tail, dst);
        (space_needed, shift)
    }

    /// Removes a variable value, shifting the tail left.
    pub(crate) fn delete_variable_raw(&mut self, offset: u32, is_varint: bool) {
        let (existing_value_bytes, mut space_available) = self.get_varuint(offset);
        if !is_varint {
            debug_assert!(existing_value_bytes < u64::from(self.length));
            space_available += existing_value_bytes as u32;
        }

        let src = (offset + space_available) as usize;
        let tail = (self.length - (offset + space_available)) as usize;
        self.buf.copy_within(src..src + tail, offset as usize);
        self.length -= space_available;
    }

    // --- fixed-column scalar access ---

    /// Clears the presence bit of a fixed column.
    ///
    /// The value bytes are not zeroed; the column simply reads as not
    /// present.  Fails with `TypeMismatch` for non-nullable columns and
    /// `NotFound` if the bit is already clear.
    pub fn delete_fixed(&mut self, scope: &RowCursor, col: &LayoutColumn) -> Result<()> {
        assert!(scope.scope_type.is_udt());
        if scope.immutable {
            return Err(Error::InsufficientPermissions);
        }
        if col.null_bit().is_invalid() {
            // Cannot delete a non-nullable fixed column.
            return Err(Error::TypeMismatch);
        }
        if !self.read_bit(scope.start, col.null_bit()) {
            return Err(Error::NotFound);
        }
        self.unset_bit(scope.start, col.null_bit());
        Ok(())
    }

    /// Reports whether a fixed or variable column currently holds a value.
    pub fn has_value(&self, scope: &RowCursor, col: &LayoutColumn) -> Result<()> {
        if !self.read_bit(scope.start, col.null_bit()) {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Writes a fixed boolean column.
    pub fn write_fixed_bool(
        &mut self,
        scope: &RowCursor,
        col: &LayoutColumn,
        value: bool,
    ) -> Result<()> {
        assert!(scope.scope_type.is_udt());
        if scope.immutable {
            return Err(Error::InsufficientPermissions);
        }
        if value {
            self.set_bit(scope.start, col.bool_bit());
        } else {
            self.unset_bit(scope.start, col.bool_bit());
        }
        self.set_bit(scope.start, col.null_bit());
        Ok(())
    }

    /// Reads a fixed boolean column.
    pub fn read_fixed_bool(&self, scope: &RowCursor, col: &LayoutColumn) -> Result<bool> {
        assert!(scope.scope_type.is_udt());
        if !self.read_bit(scope.start, col.null_bit()) {
            return Err(Error::NotFound);
        }
        Ok(self.read_bit(scope.start, col.bool_bit()))
    }

    /// Writes a fixed null column (presence only).
    pub fn write_fixed_null(&mut self, scope: &RowCursor, col: &LayoutColumn) -> Result<()> {
        assert!(scope.scope_type.is_udt());
        if scope.immutable {
            return Err(Error::InsufficientPermissions);
        }
        self.set_bit(scope.start, col.null_bit());
        Ok(())
    }

    /// Reads a fixed null column; `NotFound` if the null was never written.
    pub fn read_fixed_null(&self, scope: &RowCursor, col: &LayoutColumn) -> Result<()> {
        assert!(scope.scope_type.is_udt());
        if !self.read_bit(scope.start, col.null_bit()) {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Writes a fixed-length UTF-8 column; the value must exactly fill the
    /// column's declared size.
    pub fn write_fixed_utf8(
        &mut self,
        scope: &RowCursor,
        col: &LayoutColumn,
        value: &str,
    ) -> Result<()> {
        assert!(scope.scope_type.is_udt());
        assert_eq!(value.len() as u32, col.size());
        if scope.immutable {
            return Err(Error::InsufficientPermissions);
        }
        self.write_fixed_string_raw(scope.start + col.offset(), value);
        self.set_bit(scope.start, col.null_bit());
        Ok(())
    }

    /// Reads a fixed-length UTF-8 column.
    pub fn read_fixed_utf8(&self, scope: &RowCursor, col: &LayoutColumn) -> Result<&str> {
        assert!(scope.scope_type.is_udt());
        if !self.read_bit(scope.start, col.null_bit()) {
            return Err(Error::NotFound);
        }
        Ok(self.read_fixed_string_raw(scope.start + col.offset(), col.size()))
    }

    /// Writes a fixed-length binary column, zero-padded to the declared
    /// size.
    pub fn write_fixed_binary(
        &mut self,
        scope: &RowCursor,
        col: &LayoutColumn,
        value: &[u8],
    ) -> Result<()> {
        assert!(scope.scope_type.is_udt());
        assert!(value.len() as u32 <= col.size());
        if scope.immutable {
            return Err(Error::InsufficientPermissions);
        }
        self.write_fixed_binary_raw(scope.start + col.offset(), value, col.size());
        self.set_bit(scope.start, col.null_bit());
        Ok(())
    }

    /// Reads a fixed-length binary column.
    pub fn read_fixed_binary(&self, scope: &RowCursor, col: &LayoutColumn) -> Result<&[u8]> {
        assert!(scope.scope_type.is_udt());
        if !self.read_bit(scope.start, col.null_bit()) {
            return Err(Error::NotFound);
        }
        Ok(self.read_fixed_binary_raw(scope.start + col.offset(), col.size()))
    }

    // --- variable-column access ---

    /// Writes a variable-length UTF-8 column, shifting later columns as
    /// needed.  Fails with `TooBig` if the value exceeds the declared
    /// maximum length.
    pub fn write_variable_utf8(
        &mut self,
        scope: &mut RowCursor,
        col: &LayoutColumn,
        value: &str,
    ) -> Result<()> {
        assert!(scope.scope_type.is_udt());
        if scope.immutable {
            return Err(Error::InsufficientPermissions);
        }
        if col.size() > 0 && value.len() as u32 > col.size() {
            return Err(Error::TooBig);
        }

        let exists = self.read_bit(scope.start, col.null_bit());
        let var_offset = self.compute_variable_value_offset(&scope.layout, scope.start, col.offset());
        let num_bytes = value.len() as u32;
        let (space_needed, shift) = self.ensure_variable(var_offset, false, num_bytes, exists);
        let size_len = self.write_string(var_offset, value);
        debug_assert_eq!(space_needed, num_bytes + size_len);
        self.set_bit(scope.start, col.null_bit());
        self.apply_shift(shift);
        scope.meta_offset = scope.meta_offset.wrapping_add_signed(shift);
        scope.value_offset = scope.value_offset.wrapping_add_signed(shift);
        Ok(())
    }

    /// Reads a variable-length UTF-8 column.
    pub fn read_variable_utf8(&self, scope: &RowCursor, col: &LayoutColumn) -> Result<&str> {
        assert!(scope.scope_type.is_udt());
        if !self.read_bit(scope.start, col.null_bit()) {
            return Err(Error::NotFound);
        }
        let var_offset = self.compute_variable_value_offset(&scope.layout, scope.start, col.offset());
        Ok(self.read_string(var_offset).0)
    }

    /// Writes a variable-length binary column.
    pub fn write_variable_binary(
        &mut self,
        scope: &mut RowCursor,
        col: &LayoutColumn,
        value: &[u8],
    ) -> Result<()> {
        assert!(scope.scope_type.is_udt());
        if scope.immutable {
            return Err(Error::InsufficientPermissions);
        }
        if col.size() > 0 && value.len() as u32 > col.size() {
            return Err(Error::TooBig);
        }

        let exists = self.read_bit(scope.start, col.null_bit());
        let var_offset = self.compute_variable_value_offset(&scope.layout, scope.start, col.offset());
        let num_bytes = value.len() as u32;
        let (space_needed, shift) = self.ensure_variable(var_offset, false, num_bytes, exists);
        let size_len = self.write_binary(var_offset, value);
        debug_assert_eq!(space_needed, num_bytes + size_len);
        self.set_bit(scope.start, col.null_bit());
        self.apply_shift(shift);
        scope.meta_offset = scope.meta_offset.wrapping_add_signed(shift);
        scope.value_offset = scope.value_offset.wrapping_add_signed(shift);
        Ok(())
    }

    /// Reads a variable-length binary column.
    pub fn read_variable_binary(&self, scope: &RowCursor, col: &LayoutColumn) -> Result<&[u8]> {
        assert!(scope.scope_type.is_udt());
        if !self.read_bit(scope.start, col.null_bit()) {
            return Err(Error::NotFound);
        }
        let var_offset = self.compute_variable_value_offset(&scope.layout, scope.start, col.offset());
        Ok(self.read_binary(var_offset).0)
    }

    /// Writes a variable-length signed integer column.
    pub fn write_variable_varint(
        &mut self,
        scope: &mut RowCursor,
        col: &LayoutColumn,
        value: i64,
    ) -> Result<()> {
        assert!(scope.scope_type.is_udt());
        if scope.immutable {
            return Err(Error::InsufficientPermissions);
        }

        let exists = self.read_bit(scope.start, col.null_bit());
        let var_offset = self.compute_variable_value_offset(&scope.layout, scope.start, col.offset());
        let num_bytes = codec::count_varint(value);
        let (space_needed, shift) = self.ensure_variable(var_offset, true, num_bytes, exists);
        let size_len = self.put_varint(var_offset, value);
        debug_assert_eq!(size_len, num_bytes);
        debug_assert_eq!(space_needed, num_bytes);
        self.set_bit(scope.start, col.null_bit());
        self.apply_shift(shift);
        scope.meta_offset = scope.meta_offset.wrapping_add_signed(shift);
        scope.value_offset = scope.value_offset.wrapping_add_signed(shift);
        Ok(())
    }

    /// Reads a variable-length signed integer column.
    pub fn read_variable_varint(&self, scope: &RowCursor, col: &LayoutColumn) -> Result<i64> {
        assert!(scope.scope_type.is_udt());
        if !self.read_bit(scope.start, col.null_bit()) {
            return Err(Error::NotFound);
        }
        let var_offset = self.compute_variable_value_offset(&scope.layout, scope.start, col.offset());
        Ok(self.get_varint(var_offset).0)
    }

    /// Writes a variable-length unsigned integer column.
    pub fn write_variable_varuint(
        &mut self,
        scope: &mut RowCursor,
        col: &LayoutColumn,
        value: u64,
    ) -> Result<()> {
        assert!(scope.scope_type.is_udt());
        if scope.immutable {
            return Err(Error::InsufficientPermissions);
        }

        let exists = self.read_bit(scope.start, col.null_bit());
        let var_offset = self.compute_variable_value_offset(&scope.layout, scope.start, col.offset());
        let num_bytes = codec::count_varuint(value);
        let (space_needed, shift) = self.ensure_variable(var_offset, true, num_bytes, exists);
        let size_len = self.put_varuint(var_offset, value);
        debug_assert_eq!(size_len, num_bytes);
        debug_assert_eq!(space_needed, num_bytes);
        self.set_bit(scope.start, col.null_bit());
        self.apply_shift(shift);
        scope.meta_offset = scope.meta_offset.wrapping_add_signed(shift);
        scope.value_offset = scope.value_offset.wrapping_add_signed(shift);
        Ok(())
    }

    /// Reads a variable-length unsigned integer column.
    pub fn read_variable_varuint(&self, scope: &RowCursor, col: &LayoutColumn) -> Result<u64> {
        assert!(scope.scope_type.is_udt());
        if !self.read_bit(scope.start, col.null_bit()) {
            return Err(Error::NotFound);
        }
        let var_offset = self.compute_variable_value_offset(&scope.layout, scope.start, col.offset());
        Ok(self.get_varuint(var_offset).0)
    }

    /// Deletes a variable column if present, shifting the tail left.
    pub fn delete_variable(&mut self, scope: &RowCursor, col: &LayoutColumn) -> Result<()> {
        assert!(scope.scope_type.is_udt());
        if scope.immutable {
            return Err(Error::InsufficientPermissions);
        }
        let exists = self.read_bit(scope.start, col.null_bit());
        if exists {
            let var_offset =
                self.compute_variable_value_offset(&scope.layout, scope.start, col.offset());
            self.delete_variable_raw(var_offset, col.layout_type().is_varint());
            self.unset_bit(scope.start, col.null_bit());
        }
        Ok(())
    }
}

impl Default for RowBuffer {
    fn default() -> Self {
        RowBuffer::new()
    }
}

macro_rules! le_scalar {
    ($($put:ident, $get:ident, $t:ty);* $(;)?) => {$(
        impl RowBuffer {
            pub(crate) fn $put(&mut self, offset: u32, value: $t) {
                let offset = offset as usize;
                self.buf[offset..offset + size_of::<$t>()]
                    .copy_from_slice(&value.to_le_bytes());
            }

            pub(crate) fn $get(&self, offset: u32) -> $t {
                let offset = offset as usize;
                <$t>::from_le_bytes(
                    self.buf[offset..offset + size_of::<$t>()].try_into().unwrap(),
                )
            }
        }
    )*};
}

le_scalar! {
    put_i16, get_i16, i16;
    put_i32, get_i32, i32;
    put_i64, get_i64, i64;
    put_u16, get_u16, u16;
    put_u32, get_u32, u32;
    put_u64, get_u64, u64;
    put_f32, get_f32, f32;
    put_f64, get_f64, f64;
}

impl RowBuffer {
    pub(crate) fn put_float128(&mut self, offset: u32, value: Float128) {
        self.put_u64(offset, value.low);
        self.put_u64(offset + 8, value.high);
    }

    pub(crate) fn get_float128(&self, offset: u32) -> Float128 {
        Float128 {
            low: self.get_u64(offset),
            high: self.get_u64(offset + 8),
        }
    }

    pub(crate) fn put_decimal(&mut self, offset: u32, value: Decimal) {
        let offset = offset as usize;
        self.buf[offset..offset + 16].copy_from_slice(&value.bits);
    }

    pub(crate) fn get_decimal(&self, offset: u32) -> Decimal {
        let offset = offset as usize;
        Decimal {
            bits: self.buf[offset..offset + 16].try_into().unwrap(),
        }
    }

    pub(crate) fn put_date_time(&mut self, offset: u32, value: DateTime) {
        self.put_i64(offset, value.ticks);
    }

    pub(crate) fn get_date_time(&self, offset: u32) -> DateTime {
        DateTime {
            ticks: self.get_i64(offset),
        }
    }

    pub(crate) fn put_unix_date_time(&mut self, offset: u32, value: UnixDateTime) {
        self.put_i64(offset, value.milliseconds);
    }

    pub(crate) fn get_unix_date_time(&self, offset: u32) -> UnixDateTime {
        UnixDateTime {
            milliseconds: self.get_i64(offset),
        }
    }

    pub(crate) fn put_guid(&mut self, offset: u32, value: Guid) {
        let offset = offset as usize;
        self.buf[offset..offset + 16].copy_from_slice(value.as_bytes());
    }

    pub(crate) fn get_guid(&self, offset: u32) -> Guid {
        let offset = offset as usize;
        Guid::from_bytes(self.buf[offset..offset + 16].try_into().unwrap())
    }

    pub(crate) fn put_mongo_object_id(&mut self, offset: u32, value: MongoObjectId) {
        let offset = offset as usize;
        self.buf[offset..offset + 12].copy_from_slice(&value.bytes);
    }

    pub(crate) fn get_mongo_object_id(&self, offset: u32) -> MongoObjectId {
        let offset = offset as usize;
        MongoObjectId {
            bytes: self.buf[offset..offset + 12].try_into().unwrap(),
        }
    }
}
