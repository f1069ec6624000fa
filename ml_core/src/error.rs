use std::fmt;

/// The result type used across the core crate.
pub type Result<T> = std::result::Result<T, MlError>;

/// Errors produced when the network, its buffers or its inputs are wired incorrectly.
///
/// Every variant denotes a configuration defect upstream, they are never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum MlError {
    /// An input is invalid for semantic or domain reasons.
    InvalidInput(&'static str),

    /// A shape invariant was violated (e.g. mismatched lengths).
    ShapeMismatch {
        /// Human-readable context for the mismatch (e.g. "input", "gradients").
        what: &'static str,
        /// Observed value.
        got: usize,
        /// Expected value.
        expected: usize,
    },

    /// The layer description can't be turned into a flat network.
    InvalidTopology(String),
}

impl fmt::Display for MlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            MlError::ShapeMismatch {
                what,
                got,
                expected,
            } => {
                write!(f, "shape mismatch for {what}: got {got}, expected {expected}")
            }
            MlError::InvalidTopology(msg) => write!(f, "invalid topology: {msg}"),
        }
    }
}

impl std::error::Error for MlError {}

/// Returns a `ShapeMismatch` error if `got` differs from `expected`.
pub(crate) fn ensure_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(MlError::ShapeMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}
