//! Mutation behavior options.

/// Describes the desired behavior when writing a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateOptions {
    /// Overwrite an existing value; fail with `NotFound` if absent.
    Update,

    /// Insert a new value; fail with `Exists` if present.
    Insert,

    /// Update an existing value or insert a new one if absent.
    #[default]
    Upsert,

    /// Within an array scope, insert at the index moving subsequent items
    /// right; elsewhere behaves like `Upsert`.  Never overwrites.
    InsertAt,
}

/// Full set of row mutations, including deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowOptions {
    Update,
    Insert,
    Upsert,
    InsertAt,
    Delete,
}

impl From<UpdateOptions> for RowOptions {
    fn from(options: UpdateOptions) -> RowOptions {
        match options {
            UpdateOptions::Update => RowOptions::Update,
            UpdateOptions::Insert => RowOptions::Insert,
            UpdateOptions::Upsert => RowOptions::Upsert,
            UpdateOptions::InsertAt => RowOptions::InsertAt,
        }
    }
}
