mod config;
mod error;
mod interleave;
mod metrics;
mod state;
mod worker;

pub use config::WorkerConfig;
pub use error::{Result, WorkerErr};
pub use interleave::{Interleave, Route, Source, Sources};
pub use metrics::RoundStats;
pub use state::WorkerState;
pub use worker::{GradientWorker, Partition, RoundOutput};
