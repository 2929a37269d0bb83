//! Row encoding and navigation: [`RowBuffer`], [`RowCursor`], and the
//! sparse-field protocol.

mod buffer;
mod cursor;
mod header;
mod options;
mod scalars;
mod scopes;
mod sparse;
mod unique;

pub use buffer::RowBuffer;
pub use cursor::RowCursor;
pub use header::{HybridRowHeader, HybridRowVersion};
pub use options::UpdateOptions;
