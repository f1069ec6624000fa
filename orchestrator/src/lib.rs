pub mod configs;
mod coordinator;
mod error;
mod partition;

use serde::Serialize;

use configs::{Adapter, ModelConfig, TrainingConfig};

pub use coordinator::{Coordinator, CoordinatorConfig, Round};
pub use error::{OrchestratorError, Result};
pub use partition::{partition, shard_range};

/// The outcome of a single gradient round and validation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub seed: u64,
    pub weights: Vec<f32>,
    pub gradients: Vec<f64>,
    pub training_error: f64,
    /// Absent when the session has no validation records.
    pub validation_error: Option<f64>,
    pub training_records: u64,
    pub validation_records: u64,
}

/// Builds a session from the configs, runs one gradient round and, when there are validation
/// records, one validation pass over the initial weights.
///
/// # Errors
/// Returns an `OrchestratorError` if the configs are invalid or any partition fails.
pub fn evaluate(model: ModelConfig, training: TrainingConfig) -> Result<Report> {
    log::info!("adapting configs");
    let setup = Adapter::new().adapt_configs(model, training)?;
    let network = setup.network;

    let mut coordinator = Coordinator::new(&network, setup.sources, setup.coordinator)?;
    let round = coordinator.run_round(&network)?;
    let validation_error = if coordinator.has_validation() {
        Some(coordinator.compute_validation_error(&network)?)
    } else {
        None
    };

    Ok(Report {
        seed: setup.seed,
        weights: network.weights().to_vec(),
        gradients: round.gradients,
        training_error: round.error,
        validation_error,
        training_records: round.stats.training,
        validation_records: round.stats.validation,
    })
}
