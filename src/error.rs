//! Error types for OBST construction and key-set editing.

use thiserror::Error;

/// Result type alias for OBST operations.
pub type Result<T> = std::result::Result<T, ObstError>;

/// Recoverable conditions reported back to the caller.
///
/// None of these leave partial state behind: sequences and trees are only
/// mutated once every precondition has been checked.
#[derive(Error, Debug)]
pub enum ObstError {
    /// `P` and `Q` do not both have length `n + 1`.
    #[error("shape mismatch: expected P and Q of equal length n+1 >= 1, got |P|={p}, |Q|={q}")]
    ShapeMismatch { p: usize, q: usize },

    /// Number of labels disagrees with the number of keys in `P`.
    #[error("label count mismatch: {labels} labels for {keys} keys")]
    LabelCountMismatch { labels: usize, keys: usize },

    /// Editing a key set that models unsuccessful-search probabilities.
    #[error("cannot edit a tree built with non-zero dummy-key probabilities (q)")]
    DummyProbabilitiesInUse,

    /// Deleting a label that is not part of the key set.
    #[error("label not found: {0}")]
    LabelNotFound(String),

    /// Inserting a label that is already present.
    #[error("duplicate label: {0}")]
    DuplicateLabel(String),

    /// A probability that is negative, infinite or NaN.
    #[error("invalid probability {value} for {label}")]
    InvalidProbability { label: String, value: f64 },

    /// Root search name other than `knuth` or `full`.
    #[error("unknown root search '{0}' (expected knuth or full)")]
    UnknownRootSearch(String),

    /// Operation requires a built tree.
    #[error("the tree is empty")]
    EmptyTree,

    /// I/O error while writing rendered output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::ObstError;

    #[test]
    fn messages_name_the_offending_input() {
        let err = ObstError::ShapeMismatch { p: 4, q: 3 };
        assert_eq!(
            err.to_string(),
            "shape mismatch: expected P and Q of equal length n+1 >= 1, got |P|=4, |Q|=3"
        );
        assert_eq!(
            ObstError::LabelNotFound("Z".into()).to_string(),
            "label not found: Z"
        );
    }
}
