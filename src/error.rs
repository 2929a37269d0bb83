//! Error type shared by every row operation.

use thiserror::Error;

/// Recoverable outcomes of row operations.
///
/// These describe data-dependent conditions the caller is expected to handle.
/// Invariant violations (corrupt cursors, unknown schema ids, writes through
/// a cursor that was never writable) are programmer errors and panic instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The operation failed for an unspecified reason.
    #[error("operation failed")]
    Failure,

    /// The requested field is not present in the row.
    #[error("field not found")]
    NotFound,

    /// A field with the same path or key already exists.
    #[error("field already exists")]
    Exists,

    /// The value exceeds the declared maximum length of its column.
    #[error("value too big for column")]
    TooBig,

    /// The type of an existing field does not match the expected type for
    /// this operation.
    #[error("type mismatch")]
    TypeMismatch,

    /// An attempt to write in a read-only scope.
    #[error("insufficient permissions")]
    InsufficientPermissions,

    /// An attempt to write a field that did not match its (optional) type
    /// constraints.
    #[error("type constraint violated")]
    TypeConstraint,

    /// The byte sequence could not be parsed as a valid row.
    #[error("invalid row")]
    InvalidRow,

    /// The byte sequence was too short for the requested action.
    #[error("insufficient buffer")]
    InsufficientBuffer,

    /// The operation was cancelled.
    #[error("operation canceled")]
    Canceled,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
