//! Compiled schemas: layout codes, type descriptors, columns, and the
//! layout compiler.
//!
//! A [`Layout`] pins down the number, order, and physical type of every
//! schematized column of a row.  Layouts are produced by compiling a
//! [`Schema`](crate::schema::Schema) or directly through a
//! [`LayoutBuilder`], and are immutable afterwards.

mod args;
mod bit;
mod builder;
mod code;
mod column;
mod resolver;
mod tokenizer;
pub mod typ;

use std::collections::HashMap;

pub use args::{TypeArgument, TypeArgumentList};
pub use bit::LayoutBit;
pub use builder::LayoutBuilder;
pub use code::LayoutCode;
pub use column::{LayoutColumn, StorageKind};
pub use resolver::{LayoutResolver, LayoutResolverNamespace};
pub use tokenizer::{StringToken, StringTokenizer};
pub use typ::LayoutType;

use crate::schema::SchemaId;

/// An immutable compiled schema.
///
/// The column order and types define the physical byte layout of a row and
/// the cost of updating it.
#[derive(PartialEq)]
pub struct Layout {
    name: String,
    schema_id: SchemaId,
    size: u32,
    num_bitmask_bytes: u32,
    num_fixed: u32,
    num_variable: u32,
    tokenizer: StringTokenizer,
    columns: Vec<LayoutColumn>,
    top_columns: Vec<usize>,
    path_map: HashMap<String, usize>,
}

impl Layout {
    pub(crate) fn new(
        name: &str,
        schema_id: SchemaId,
        num_bitmask_bytes: u32,
        min_required_size: u32,
        columns: Vec<LayoutColumn>,
    ) -> Layout {
        let mut tokenizer = StringTokenizer::new();
        let mut top_columns = Vec::with_capacity(columns.len());
        let mut path_map = HashMap::with_capacity(columns.len());
        let mut num_fixed = 0;
        let mut num_variable = 0;
        for (i, c) in columns.iter().enumerate() {
            tokenizer.add(c.path());
            path_map.insert(c.full_path().to_owned(), i);
            match c.storage() {
                StorageKind::Fixed => num_fixed += 1,
                StorageKind::Variable => num_variable += 1,
                StorageKind::Sparse => {}
            }
            if c.parent().is_none() {
                top_columns.push(i);
            }
        }

        Layout {
            name: name.to_owned(),
            schema_id,
            size: min_required_size,
            num_bitmask_bytes,
            num_fixed,
            num_variable,
            tokenizer,
            columns,
            top_columns,
            path_map,
        }
    }

    /// Name of the layout, usually the name of the schema it was compiled
    /// from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unique identifier of the schema from which this layout was generated.
    #[must_use]
    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }

    /// Minimum required size of a row of this layout, excluding the header
    /// and all sparse columns, with every variable column null.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The number of bitmask bytes allocated within the layout.
    ///
    /// Every nullable fixed or variable column takes a presence bit; fixed
    /// booleans take an additional value bit.  Sparse columns never have
    /// presence bits.
    #[must_use]
    pub fn num_bitmask_bytes(&self) -> u32 {
        self.num_bitmask_bytes
    }

    /// The number of fixed columns.
    #[must_use]
    pub fn num_fixed(&self) -> u32 {
        self.num_fixed
    }

    /// The number of variable-length columns.
    #[must_use]
    pub fn num_variable(&self) -> u32 {
        self.num_variable
    }

    /// A tokenizer holding the relative path of every column.
    #[must_use]
    pub fn tokenizer(&self) -> &StringTokenizer {
        &self.tokenizer
    }

    /// All columns, in physical order (fixed, then variable, then sparse).
    #[must_use]
    pub fn columns(&self) -> &[LayoutColumn] {
        &self.columns
    }

    /// The top-level columns, in declared order.
    pub fn top_columns(&self) -> impl ExactSizeIterator<Item = &LayoutColumn> {
        self.top_columns.iter().map(|&i| &self.columns[i])
    }

    /// Finds the column with the given full path.
    #[must_use]
    pub fn try_find(&self, path: &str) -> Option<&LayoutColumn> {
        self.path_map.get(path).map(|&i| &self.columns[i])
    }
}

impl std::fmt::Debug for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layout")
            .field("name", &self.name)
            .field("schema_id", &self.schema_id)
            .field("size", &self.size)
            .field("columns", &self.columns.len())
            .finish()
    }
}
