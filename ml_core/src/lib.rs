mod activation;
pub mod data;
mod error;
mod error_fn;
mod init;
mod network;
mod stats;

pub use activation::ActFn;
pub use data::{DataError, InMemorySource, Record, SampleSource};
pub use error::{MlError, Result};
pub use error_fn::ErrorFn;
pub use init::ParamGen;
pub use network::{BIAS_ACTIVATION, FlatNetwork, LayerSpec, Scratch};
pub use stats::ErrorAccumulator;
