//! Navigation and edit state over a row.

use std::fmt;
use std::sync::Arc;

use super::RowBuffer;
use super::header::HybridRowHeader;
use crate::layout::{
    Layout, LayoutCode, LayoutType, StringToken, TypeArgument, TypeArgumentList, typ,
};

/// A cursor into a [`RowBuffer`].
///
/// A cursor identifies a scope within the row plus the position of one field
/// within it (an "edit").  Cursors are value types with independent
/// lifetimes, but any mutation of the underlying row invalidates every other
/// cursor into the same row; after a mutating call, continue only with the
/// cursor that was passed to it.
#[derive(Clone, PartialEq)]
pub struct RowCursor {
    /// The layout describing the scope's schematized content.
    pub(crate) layout: Arc<Layout>,
    /// The kind of scope within which this edit was prepared.
    pub(crate) scope_type: &'static LayoutType,
    /// The type parameters of the scope.
    pub(crate) scope_type_args: TypeArgumentList,
    /// If true, this scope's nested fields cannot be updated individually.
    pub(crate) immutable: bool,
    /// If true, this is a unique scope whose index will be rebuilt after
    /// its items are written.
    pub(crate) defer_unique_index: bool,
    /// Byte offset of the first sparse field within the scope.
    pub(crate) start: u32,
    /// True if an existing field matching the search criteria was found.
    pub(crate) exists: bool,
    /// The scope-relative path for writing, if any.
    pub(crate) write_path: Option<String>,
    /// The interned token of the write path, if tokenized.
    pub(crate) write_path_token: Option<StringToken>,
    /// Offset of the existing field's path for reading.
    pub(crate) path_offset: u32,
    /// Token of the existing field's path for reading.
    pub(crate) path_token: u32,
    /// Offset of the existing field's metadata, or the insertion point.
    pub(crate) meta_offset: u32,
    /// The layout type of the existing field, if any.
    pub(crate) cell_type: Option<&'static LayoutType>,
    /// Offset of the existing field's value.
    pub(crate) value_offset: u32,
    /// Offset just past the existing field; a skip-forward hint.
    pub(crate) end_offset: u32,
    /// For sized scopes, the number of elements.
    pub(crate) count: u32,
    /// For indexed scopes, the 0-based index of the field.
    pub(crate) index: u32,
    /// Type parameters of the existing field's type.
    pub(crate) cell_type_args: TypeArgumentList,
}

impl RowCursor {
    pub(crate) fn new_scope(
        layout: Arc<Layout>,
        scope_type: &'static LayoutType,
        scope_type_args: TypeArgumentList,
        start: u32,
        meta_offset: u32,
        value_offset: u32,
    ) -> RowCursor {
        RowCursor {
            layout,
            scope_type,
            scope_type_args,
            immutable: false,
            defer_unique_index: false,
            start,
            exists: false,
            write_path: None,
            write_path_token: None,
            path_offset: 0,
            path_token: 0,
            meta_offset,
            cell_type: None,
            value_offset,
            end_offset: 0,
            count: 0,
            index: 0,
            cell_type_args: TypeArgumentList::default(),
        }
    }

    pub(crate) fn with_immutable(mut self, immutable: bool) -> RowCursor {
        self.immutable = immutable;
        self
    }

    pub(crate) fn with_count(mut self, count: u32) -> RowCursor {
        self.count = count;
        self
    }

    pub(crate) fn with_index(mut self, index: u32) -> RowCursor {
        self.index = index;
        self
    }

    /// Creates a cursor at the root scope of the row, positioned at the
    /// first sparse field.
    #[must_use]
    pub fn create(row: &RowBuffer) -> RowCursor {
        let schema_id = row.read_schema_id(1);
        let layout = row.resolver().resolve(schema_id);
        let sparse_segment_offset = row.compute_variable_value_offset(
            &layout,
            HybridRowHeader::SIZE,
            layout.num_variable(),
        );
        RowCursor::new_scope(
            layout,
            &typ::UDT,
            TypeArgumentList::from_schema_id(schema_id),
            HybridRowHeader::SIZE,
            sparse_segment_offset,
            sparse_segment_offset,
        )
    }

    /// Creates a cursor at the root scope positioned at the end of the row,
    /// for appending sparse fields without scanning prior content.
    #[must_use]
    pub fn create_for_append(row: &RowBuffer) -> RowCursor {
        let schema_id = row.read_schema_id(1);
        let layout = row.resolver().resolve(schema_id);
        RowCursor::new_scope(
            layout,
            &typ::UDT,
            TypeArgumentList::from_schema_id(schema_id),
            HybridRowHeader::SIZE,
            row.length(),
            row.length(),
        )
    }

    /// Returns an equivalent cursor that rejects all mutation.
    #[must_use]
    pub fn as_read_only(&self) -> RowCursor {
        let mut dest = self.clone();
        dest.immutable = true;
        dest
    }

    /// Marks this unique-scope cursor as bulk-loading: writes are permitted
    /// and the unique index must be rebuilt afterwards.
    pub fn set_defer_unique_index(&mut self, defer: bool) {
        self.defer_unique_index = defer;
    }

    /// Moves this cursor to the child field of the current scope with the
    /// given path.
    ///
    /// On a match `exists()` is true; otherwise the cursor is positioned
    /// where the field would be inserted.  The path is remembered as the
    /// write path for subsequent writes.
    pub fn find(&mut self, row: &RowBuffer, path: &str) -> &mut RowCursor {
        assert!(!self.scope_type.is_indexed_scope());

        if !self.cell_type.is_some_and(LayoutType::is_end_scope) {
            while row.sparse_iterator_move_next(self) {
                if row.read_sparse_path(self) == path {
                    self.exists = true;
                    break;
                }
            }
        }

        self.write_path = Some(path.to_owned());
        self.write_path_token = None;
        self
    }

    /// Like [`RowCursor::find`], but compares interned tokens instead of
    /// path bytes.
    pub fn find_token(&mut self, row: &RowBuffer, token: &StringToken) -> &mut RowCursor {
        assert!(!self.scope_type.is_indexed_scope());

        if !self.cell_type.is_some_and(LayoutType::is_end_scope) {
            while row.sparse_iterator_move_next(self) {
                if token.id() == u64::from(self.path_token) {
                    self.exists = true;
                    break;
                }
            }
        }

        self.write_path = Some(token.path().to_owned());
        self.write_path_token = Some(token.clone());
        self
    }

    /// Advances to the next field in the scope.  Returns false at the end
    /// of the scope.
    pub fn move_next(&mut self, row: &RowBuffer) -> bool {
        self.write_path = None;
        self.write_path_token = None;
        row.sparse_iterator_move_next(self)
    }

    /// Skips past `child_scope` (a scope opened at the current position)
    /// and advances to the next field.
    pub fn move_next_past(&mut self, row: &RowBuffer, child_scope: &mut RowCursor) -> bool {
        self.skip(row, child_scope);
        self.move_next(row)
    }

    /// Advances the cursor to `index`.  The cursor must not already be past
    /// it.
    pub fn move_to(&mut self, row: &RowBuffer, index: u32) -> bool {
        debug_assert!(self.index <= index);
        self.write_path = None;
        self.write_path_token = None;
        while self.index < index {
            if !row.sparse_iterator_move_next(self) {
                return false;
            }
        }
        true
    }

    /// Drains `child_scope` and records its end so this cursor can step
    /// over it.
    pub fn skip(&mut self, row: &RowBuffer, child_scope: &mut RowCursor) {
        assert!(child_scope.start == self.value_offset);
        if !child_scope.cell_type.is_some_and(LayoutType::is_end_scope) {
            while row.sparse_iterator_move_next(child_scope) {}
        }

        if child_scope.scope_type.is_sized_scope() {
            self.end_offset = child_scope.meta_offset;
        } else {
            // Move past the end-of-scope marker.
            self.end_offset = child_scope.meta_offset + LayoutCode::WIRE_SIZE;
        }
    }

    /// For schematized sparse fields, the token of the path, otherwise 0.
    #[must_use]
    pub fn token(&self) -> u64 {
        u64::from(self.path_token)
    }

    /// For indexed scopes, the 0-based index of the next insertion.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// For sized scopes, the current element count.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// True if the last search found an existing field.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// If true, this scope's nested fields cannot be updated individually.
    /// The entire scope can still be replaced.
    #[must_use]
    pub fn immutable(&self) -> bool {
        self.immutable
    }

    /// The kind of scope.
    #[must_use]
    pub fn scope_type(&self) -> &'static LayoutType {
        self.scope_type
    }

    /// The type parameters of the scope.
    #[must_use]
    pub fn scope_type_args(&self) -> &TypeArgumentList {
        &self.scope_type_args
    }

    /// The layout describing the scope's schematized content.
    #[must_use]
    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// The full logical type of the current field.
    #[must_use]
    pub fn type_arg(&self) -> TypeArgument {
        TypeArgument::new(
            self.cell_type.unwrap_or(&typ::END_SCOPE),
            self.cell_type_args.clone(),
        )
    }
}

impl fmt::Display for RowCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = TypeArgument::new(self.scope_type, self.scope_type_args.clone());
        let cell = self.type_arg();
        match &self.write_path {
            Some(path) => write!(f, "{scope}[{path}]")?,
            None => write!(f, "{scope}[{}]", self.index)?,
        }
        write!(f, " : {cell}@{}/{}", self.meta_offset, self.value_offset)?;
        if self.immutable {
            f.write_str(" immutable")?;
        }
        Ok(())
    }
}

impl fmt::Debug for RowCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
