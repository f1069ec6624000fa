use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use ml_core::{ActFn, ErrorFn, FlatNetwork, InMemorySource, LayerSpec, ParamGen};
use rand::{SeedableRng, rngs::StdRng};
use worker::{Interleave, Sources, WorkerConfig};

use super::{
    ActFnConfig, DatasetConfig, ErrorFnConfig, LayerConfig, ModelConfig, ParamGenConfig,
    TrainingConfig,
};
use crate::{coordinator::CoordinatorConfig, error::OrchestratorError};

type Result<T> = std::result::Result<T, OrchestratorError>;

/// Everything a session is built from, mapped from the user facing configs.
#[derive(Debug)]
pub struct Setup {
    pub network: FlatNetwork,
    pub sources: Sources<InMemorySource>,
    pub coordinator: CoordinatorConfig,
    /// The seed the weights and the interleaving were derived from.
    pub seed: u64,
}

/// Validates the configs and maps them to the core types.
#[derive(Debug, Default)]
pub struct Adapter;

impl Adapter {
    pub fn new() -> Self {
        Self
    }

    pub fn adapt_configs(&self, model: ModelConfig, training: TrainingConfig) -> Result<Setup> {
        self.validate_training(&training)?;

        let seed = training.seed.unwrap_or_else(wall_clock_seed);
        debug!(seed = seed; "resolved session seed");

        let network = self.adapt_model(&model, seed)?;
        self.validate_dataset(&network, &training.dataset, "dataset")?;

        let training_src = self.adapt_dataset(training.dataset)?;
        let validation_src = match training.validation {
            Some(dataset) => {
                self.validate_dataset(&network, &dataset, "validation")?;
                Some(self.adapt_dataset(dataset)?)
            }
            None => None,
        };

        let error_fn = self.adapt_error_fn(training.error_fn);
        let worker = match training.flat_spot {
            Some(flat_spot) => WorkerConfig::new(flat_spot, error_fn),
            None => WorkerConfig::for_network(&network, error_fn),
        };

        worker
            .ensure_fits(&network)
            .map_err(|e| OrchestratorError::InvalidConfig(e.to_string()))?;

        let interleave = if training.cross_validation {
            Interleave::CrossValidation { seed }
        } else {
            Interleave::Disabled
        };

        info!(
            layers = network.layer_count(),
            weights = network.weights().len(),
            workers = training.workers;
            "adapted configs"
        );

        Ok(Setup {
            network,
            sources: Sources::new(training_src, validation_src),
            coordinator: CoordinatorConfig {
                workers: training.workers,
                interleave,
                worker,
            },
            seed,
        })
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn validate_training(&self, training: &TrainingConfig) -> Result<()> {
        if training.workers == 0 {
            return Err(OrchestratorError::InvalidConfig(
                "at least one worker is required".into(),
            ));
        }

        if training.cross_validation && training.validation.is_none() {
            return Err(OrchestratorError::InvalidConfig(
                "cross validation requires a validation dataset".into(),
            ));
        }

        Ok(())
    }

    fn validate_dataset(
        &self,
        network: &FlatNetwork,
        dataset: &DatasetConfig,
        name: &str,
    ) -> Result<()> {
        let DatasetConfig::Inline { x_size, y_size, .. } = dataset;

        if *x_size != network.input_count() || *y_size != network.output_count() {
            return Err(OrchestratorError::InvalidConfig(format!(
                "{name}: records of {x_size} inputs and {y_size} targets don't fit a network \
                 of {} inputs and {} outputs",
                network.input_count(),
                network.output_count()
            )));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Adaptation
    // -------------------------------------------------------------------------

    fn adapt_model(&self, model: &ModelConfig, seed: u64) -> Result<FlatNetwork> {
        let ModelConfig::Sequential { layers, init } = model;

        let specs: Vec<_> = layers.iter().map(|l| self.adapt_layer(l)).collect();
        let mut network = FlatNetwork::new(&specs)
            .map_err(|e| OrchestratorError::InvalidConfig(e.to_string()))?;

        let mut rng = StdRng::seed_from_u64(seed);
        self.adapt_param_gen(*init)
            .fill(&mut network, &mut rng)
            .map_err(|e| OrchestratorError::InvalidConfig(e.to_string()))?;

        Ok(network)
    }

    fn adapt_layer(&self, layer: &LayerConfig) -> LayerSpec {
        let act_fn = layer.act_fn.map(|f| self.adapt_act_fn(f)).unwrap_or_default();
        LayerSpec::new(layer.neurons, act_fn, layer.bias)
    }

    fn adapt_act_fn(&self, act_fn: ActFnConfig) -> ActFn {
        match act_fn {
            ActFnConfig::Linear => ActFn::Linear,
            ActFnConfig::Sigmoid => ActFn::Sigmoid,
            ActFnConfig::Tanh => ActFn::Tanh,
            ActFnConfig::Relu => ActFn::Relu,
        }
    }

    fn adapt_param_gen(&self, param_gen: ParamGenConfig) -> ParamGen {
        match param_gen {
            ParamGenConfig::Const { value } => ParamGen::Const { value },
            ParamGenConfig::Uniform { low, high } => ParamGen::Uniform { low, high },
            ParamGenConfig::Xavier => ParamGen::Xavier,
        }
    }

    fn adapt_error_fn(&self, error_fn: ErrorFnConfig) -> ErrorFn {
        match error_fn {
            ErrorFnConfig::Linear => ErrorFn::Linear,
            ErrorFnConfig::Atan => ErrorFn::Atan,
        }
    }

    fn adapt_dataset(&self, dataset: DatasetConfig) -> Result<InMemorySource> {
        let DatasetConfig::Inline {
            data,
            x_size,
            y_size,
            significance,
        } = dataset;

        let invalid = |e: ml_core::DataError| OrchestratorError::InvalidConfig(e.to_string());
        let src = InMemorySource::new(data, x_size, y_size).map_err(invalid)?;

        match significance {
            Some(significance) => src.with_significance(significance).map_err(invalid),
            None => Ok(src),
        }
    }
}

/// Milliseconds since the unix epoch, used when no seed is configured.
fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}
