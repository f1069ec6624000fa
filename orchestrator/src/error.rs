use std::{fmt, io};

use worker::WorkerErr;

/// The orchestrator's result type.
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// All errors that can occur in the orchestrator.
#[derive(Debug)]
pub enum OrchestratorError {
    /// Invalid configuration, caught before any round runs.
    InvalidConfig(String),
    /// A worker failed, the whole round is discarded.
    Partition {
        partition: usize,
        source: WorkerErr,
    },
    /// The worker thread pool couldn't be built.
    ThreadPool(String),
    Io(io::Error),
    Json(serde_json::Error),
}

impl OrchestratorError {
    /// Returns whether the failure comes from a wiring defect rather than from data access.
    pub fn is_config(&self) -> bool {
        match self {
            Self::InvalidConfig(_) => true,
            Self::Partition { source, .. } => source.is_config(),
            _ => false,
        }
    }
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Partition { partition, source } => {
                write!(f, "partition {partition} failed: {source}")
            }
            Self::ThreadPool(msg) => write!(f, "thread pool error: {msg}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Partition { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for OrchestratorError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
