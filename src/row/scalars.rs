//! Typed scalar accessors for fixed columns and sparse fields.

use super::buffer::RowBuffer;
use super::cursor::RowCursor;
use super::options::UpdateOptions;
use crate::codec;
use crate::error::{Error, Result};
use crate::layout::{LayoutCode, LayoutColumn, TypeArgument, TypeArgumentList, typ};
use crate::types::{DateTime, Decimal, Float128, Guid, MongoObjectId, NullValue, UnixDateTime};

macro_rules! scalar_rw {
    ($($t:ty =>
        $typ:ident, $code:ident, $put:ident, $get:ident,
        $write_fixed:ident, $read_fixed:ident, $write_sparse:ident, $read_sparse:ident;)*) => {$(
        impl RowBuffer {
            /// Writes a fixed column of this type and marks it present.
            pub fn $write_fixed(
                &mut self,
                scope: &RowCursor,
                col: &LayoutColumn,
                value: $t,
            ) -> Result<()> {
                assert!(scope.scope_type.is_udt());
                if scope.immutable {
                    return Err(Error::InsufficientPermissions);
                }
                self.$put(scope.start + col.offset(), value);
                self.set_bit(scope.start, col.null_bit());
                Ok(())
            }

            /// Reads a fixed column of this type; `NotFound` if not present.
            pub fn $read_fixed(&self, scope: &RowCursor, col: &LayoutColumn) -> Result<$t> {
                assert!(scope.scope_type.is_udt());
                if !self.read_bit(scope.start, col.null_bit()) {
                    return Err(Error::NotFound);
                }
                Ok(self.$get(scope.start + col.offset()))
            }

            /// Writes a sparse field of this type at the cursor.
            pub fn $write_sparse(
                &mut self,
                edit: &mut RowCursor,
                value: $t,
                options: UpdateOptions,
            ) -> Result<()> {
                self.prepare_sparse_write(edit, &TypeArgument::of(&typ::$typ), options)?;
                let num_bytes = typ::$typ.size();
                let args = TypeArgumentList::default();
                let (meta_bytes, space_needed, shift) =
                    self.ensure_sparse(edit, &typ::$typ, &args, num_bytes, options.into());
                self.write_sparse_metadata(edit, &typ::$typ, &args, meta_bytes);
                self.$put(edit.value_offset, value);
                debug_assert_eq!(space_needed, meta_bytes + num_bytes);
                edit.end_offset = edit.meta_offset + space_needed;
                self.apply_shift(shift);
                Ok(())
            }

            /// Reads a sparse field of this type at the cursor.
            pub fn $read_sparse(&self, edit: &mut RowCursor) -> Result<$t> {
                self.prepare_sparse_read(edit, LayoutCode::$code)?;
                edit.end_offset = edit.value_offset + typ::$typ.size();
                Ok(self.$get(edit.value_offset))
            }
        }
    )*};
}

scalar_rw! {
    i8 => INT8, Int8, put_i8, get_i8,
        write_fixed_i8, read_fixed_i8, write_sparse_i8, read_sparse_i8;
    i16 => INT16, Int16, put_i16, get_i16,
        write_fixed_i16, read_fixed_i16, write_sparse_i16, read_sparse_i16;
    i32 => INT32, Int32, put_i32, get_i32,
        write_fixed_i32, read_fixed_i32, write_sparse_i32, read_sparse_i32;
    i64 => INT64, Int64, put_i64, get_i64,
        write_fixed_i64, read_fixed_i64, write_sparse_i64, read_sparse_i64;
    u8 => UINT8, UInt8, put_u8, get_u8,
        write_fixed_u8, read_fixed_u8, write_sparse_u8, read_sparse_u8;
    u16 => UINT16, UInt16, put_u16, get_u16,
        write_fixed_u16, read_fixed_u16, write_sparse_u16, read_sparse_u16;
    u32 => UINT32, UInt32, put_u32, get_u32,
        write_fixed_u32, read_fixed_u32, write_sparse_u32, read_sparse_u32;
    u64 => UINT64, UInt64, put_u64, get_u64,
        write_fixed_u64, read_fixed_u64, write_sparse_u64, read_sparse_u64;
    f32 => FLOAT32, Float32, put_f32, get_f32,
        write_fixed_f32, read_fixed_f32, write_sparse_f32, read_sparse_f32;
    f64 => FLOAT64, Float64, put_f64, get_f64,
        write_fixed_f64, read_fixed_f64, write_sparse_f64, read_sparse_f64;
    Float128 => FLOAT128, Float128, put_float128, get_float128,
        write_fixed_float128, read_fixed_float128, write_sparse_float128, read_sparse_float128;
    Decimal => DECIMAL, Decimal, put_decimal, get_decimal,
        write_fixed_decimal, read_fixed_decimal, write_sparse_decimal, read_sparse_decimal;
    DateTime => DATE_TIME, DateTime, put_date_time, get_date_time,
        write_fixed_date_time, read_fixed_date_time, write_sparse_date_time, read_sparse_date_time;
    UnixDateTime => UNIX_DATE_TIME, UnixDateTime, put_unix_date_time, get_unix_date_time,
        write_fixed_unix_date_time, read_fixed_unix_date_time,
        write_sparse_unix_date_time, read_sparse_unix_date_time;
    Guid => GUID, Guid, put_guid, get_guid,
        write_fixed_guid, read_fixed_guid, write_sparse_guid, read_sparse_guid;
    MongoObjectId => MONGO_OBJECT_ID, MongoDbObjectId, put_mongo_object_id, get_mongo_object_id,
        write_fixed_mongo_object_id, read_fixed_mongo_object_id,
        write_sparse_mongo_object_id, read_sparse_mongo_object_id;
}

impl RowBuffer {
    /// Writes a sparse null at the cursor; the value lives in the type
    /// code.
    pub fn write_sparse_null(
        &mut self,
        edit: &mut RowCursor,
        _value: NullValue,
        options: UpdateOptions,
    ) -> Result<()> {
        self.prepare_sparse_write(edit, &TypeArgument::of(&typ::NULL), options)?;
        let args = TypeArgumentList::default();
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, &typ::NULL, &args, 0, options.into());
        self.write_sparse_metadata(edit, &typ::NULL, &args, meta_bytes);
        debug_assert_eq!(space_needed, meta_bytes);
        edit.end_offset = edit.meta_offset + space_needed;
        self.apply_shift(shift);
        Ok(())
    }

    /// Reads a sparse null at the cursor.
    pub fn read_sparse_null(&self, edit: &mut RowCursor) -> Result<NullValue> {
        self.prepare_sparse_read(edit, LayoutCode::Null)?;
        edit.end_offset = edit.value_offset;
        Ok(NullValue)
    }

    /// Writes a sparse boolean at the cursor; the value lives in the type
    /// code.
    pub fn write_sparse_bool(
        &mut self,
        edit: &mut RowCursor,
        value: bool,
        options: UpdateOptions,
    ) -> Result<()> {
        self.prepare_sparse_write(edit, &TypeArgument::of(&typ::BOOLEAN), options)?;
        let cell_type = if value { &typ::BOOLEAN } else { &typ::BOOLEAN_FALSE };
        let args = TypeArgumentList::default();
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, cell_type, &args, 0, options.into());
        self.write_sparse_metadata(edit, cell_type, &args, meta_bytes);
        debug_assert_eq!(space_needed, meta_bytes);
        edit.end_offset = edit.meta_offset + space_needed;
        self.apply_shift(shift);
        Ok(())
    }

    /// Reads a sparse boolean at the cursor.
    pub fn read_sparse_bool(&self, edit: &mut RowCursor) -> Result<bool> {
        self.prepare_sparse_read(edit, LayoutCode::Boolean)?;
        edit.end_offset = edit.value_offset;
        Ok(edit.cell_type.expect("checked by prepare").code() == LayoutCode::Boolean)
    }

    /// Writes a sparse variable-length signed integer at the cursor.
    pub fn write_sparse_varint(
        &mut self,
        edit: &mut RowCursor,
        value: i64,
        options: UpdateOptions,
    ) -> Result<()> {
        self.prepare_sparse_write(edit, &TypeArgument::of(&typ::VAR_INT), options)?;
        let num_bytes = codec::count_varint(value);
        let args = TypeArgumentList::default();
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, &typ::VAR_INT, &args, num_bytes, options.into());
        self.write_sparse_metadata(edit, &typ::VAR_INT, &args, meta_bytes);
        let size_len = self.put_varint(edit.value_offset, value);
        debug_assert_eq!(size_len, num_bytes);
        debug_assert_eq!(space_needed, meta_bytes + size_len);
        edit.end_offset = edit.meta_offset + space_needed;
        self.apply_shift(shift);
        Ok(())
    }

    /// Reads a sparse variable-length signed integer at the cursor.
    pub fn read_sparse_varint(&self, edit: &mut RowCursor) -> Result<i64> {
        self.prepare_sparse_read(edit, LayoutCode::VarInt)?;
        let (value, size_len) = self.get_varint(edit.value_offset);
        edit.end_offset = edit.value_offset + size_len;
        Ok(value)
    }

    /// Writes a sparse variable-length unsigned integer at the cursor.
    pub fn write_sparse_varuint(
        &mut self,
        edit: &mut RowCursor,
        value: u64,
        options: UpdateOptions,
    ) -> Result<()> {
        self.prepare_sparse_write(edit, &TypeArgument::of(&typ::VAR_UINT), options)?;
        let num_bytes = codec::count_varuint(value);
        let args = TypeArgumentList::default();
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, &typ::VAR_UINT, &args, num_bytes, options.into());
        self.write_sparse_metadata(edit, &typ::VAR_UINT, &args, meta_bytes);
        let size_len = self.put_varuint(edit.value_offset, value);
        debug_assert_eq!(size_len, num_bytes);
        debug_assert_eq!(space_needed, meta_bytes + size_len);
        edit.end_offset = edit.meta_offset + space_needed;
        self.apply_shift(shift);
        Ok(())
    }

    /// Reads a sparse variable-length unsigned integer at the cursor.
    pub fn read_sparse_varuint(&self, edit: &mut RowCursor) -> Result<u64> {
        self.prepare_sparse_read(edit, LayoutCode::VarUInt)?;
        let (value, size_len) = self.get_varuint(edit.value_offset);
        edit.end_offset = edit.value_offset + size_len;
        Ok(value)
    }

    /// Writes a sparse UTF-8 string at the cursor.
    pub fn write_sparse_utf8(
        &mut self,
        edit: &mut RowCursor,
        value: &str,
        options: UpdateOptions,
    ) -> Result<()> {
        self.prepare_sparse_write(edit, &TypeArgument::of(&typ::UTF8), options)?;
        let len = value.len() as u32;
        let num_bytes = len + codec::count_varuint(u64::from(len));
        let args = TypeArgumentList::default();
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, &typ::UTF8, &args, num_bytes, options.into());
        self.write_sparse_metadata(edit, &typ::UTF8, &args, meta_bytes);
        let size_len = self.write_string(edit.value_offset, value);
        debug_assert_eq!(space_needed, meta_bytes + len + size_len);
        edit.end_offset = edit.meta_offset + space_needed;
        self.apply_shift(shift);
        Ok(())
    }

    /// Reads a sparse UTF-8 string at the cursor.
    pub fn read_sparse_utf8(&self, edit: &mut RowCursor) -> Result<&str> {
        self.prepare_sparse_read(edit, LayoutCode::Utf8)?;
        let (value, size_len) = self.read_string(edit.value_offset);
        edit.end_offset = edit.value_offset + size_len + value.len() as u32;
        Ok(value)
    }

    /// Writes a sparse byte string at the cursor.
    pub fn write_sparse_binary(
        &mut self,
        edit: &mut RowCursor,
        value: &[u8],
        options: UpdateOptions,
    ) -> Result<()> {
        self.prepare_sparse_write(edit, &TypeArgument::of(&typ::BINARY), options)?;
        let len = value.len() as u32;
        let num_bytes = len + codec::count_varuint(u64::from(len));
        let args = TypeArgumentList::default();
        let (meta_bytes, space_needed, shift) =
            self.ensure_sparse(edit, &typ::BINARY, &args, num_bytes, options.into());
        self.write_sparse_metadata(edit, &typ::BINARY, &args, meta_bytes);
        let size_len = self.write_binary(edit.value_offset, value);
        debug_assert_eq!(space_needed, meta_bytes + len + size_len);
        edit.end_offset = edit.meta_offset + space_needed;
        self.apply_shift(shift);
        Ok(())
    }

    /// Reads a sparse byte string at the cursor.
    pub fn read_sparse_binary(&self, edit: &mut RowCursor) -> Result<&[u8]> {
        self.prepare_sparse_read(edit, LayoutCode::Binary)?;
        let (value, size_len) = self.read_binary(edit.value_offset);
        edit.end_offset = edit.value_offset + size_len + value.len() as u32;
        Ok(value)
    }
}
