use thiserror::Error;

/// Failure of a position lookup or of a transaction step.
///
/// Commands report "not applicable" as a value, never through this type.
/// Any of these errors aborts the whole transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("position {pos} is outside the document (size {size})")]
    OutOfRange { pos: usize, size: usize },

    #[error("invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    #[error("no block node starts at position {pos}")]
    NoNodeAt { pos: usize },

    #[error("{content} content is not allowed inside {parent}")]
    ContentMismatch {
        parent: &'static str,
        content: &'static str,
    },

    #[error("cannot change a {from} node into a {to} node")]
    IncompatibleKind {
        from: &'static str,
        to: &'static str,
    },

    #[error("document invariant violated: {0}")]
    InvariantViolation(String),
}
