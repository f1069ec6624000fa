mod adapter;
mod model;
mod training;

pub use adapter::{Adapter, Setup};
pub use model::{ActFnConfig, LayerConfig, ModelConfig, ParamGenConfig};
pub use training::{DatasetConfig, ErrorFnConfig, TrainingConfig};
