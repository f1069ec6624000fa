use std::{error::Error, fmt};

use ml_core::{DataError, MlError};

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Failures of a gradient round, any of them invalidates the worker's whole round.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerErr {
    /// The network, the worker's buffers or the examples don't fit together.
    Config(MlError),
    GradientLengthMismatch {
        got: usize,
        expected: usize,
    },
    /// The record at the given global index couldn't be fetched.
    Data {
        index: usize,
        source: DataError,
    },
}

impl WorkerErr {
    /// Returns whether the failure comes from a wiring defect rather than from data access.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            WorkerErr::Config(_) | WorkerErr::GradientLengthMismatch { .. }
        )
    }
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Config(e) => write!(f, "configuration error: {e}"),
            WorkerErr::GradientLengthMismatch { got, expected } => write!(
                f,
                "gradient length mismatch: got {got}, expected {expected}"
            ),
            WorkerErr::Data { index, source } => {
                write!(f, "failed to fetch record {index}: {source}")
            }
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Config(e) => Some(e),
            WorkerErr::Data { source, .. } => Some(source),
            WorkerErr::GradientLengthMismatch { .. } => None,
        }
    }
}

impl From<MlError> for WorkerErr {
    fn from(value: MlError) -> Self {
        Self::Config(value)
    }
}
