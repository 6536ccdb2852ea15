//! Error types for vantage.

use thiserror::Error;

use crate::point::Label;

/// Errors that can occur during tree construction or search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VpTreeError {
    /// The two points' dimension-label sequences differ, by value or by order.
    #[error("dimension mismatch: {left:?} vs {right:?}")]
    DimensionMismatch {
        /// Dimension labels of the left-hand point.
        left: Vec<Label>,
        /// Dimension labels of the right-hand point.
        right: Vec<Label>,
    },
    /// A tree cannot be built from an empty point collection.
    #[error("cannot build a tree from an empty point collection")]
    EmptyInput,
    /// `find_nearest` requires a positive result count.
    #[error("invalid result count: {0}")]
    InvalidCount(usize),
}

pub type Result<T> = std::result::Result<T, VpTreeError>;
