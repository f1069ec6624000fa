use ml_core::{ErrorFn, FlatNetwork, MlError};

/// Immutable numeric settings of a gradient worker.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    flat_spot: Vec<f32>,
    error_fn: ErrorFn,
}

impl WorkerConfig {
    /// Creates a new worker configuration.
    ///
    /// # Args
    /// * `flat_spot` - The constant added to the activation derivative, one per layer.
    /// * `error_fn` - The function turning target and output into the output error signal.
    ///
    /// # Returns
    /// A `WorkerConfig` instance.
    pub fn new(flat_spot: Vec<f32>, error_fn: ErrorFn) -> Self {
        Self {
            flat_spot,
            error_fn,
        }
    }

    /// Creates a configuration using every layer's default flat spot.
    pub fn for_network(network: &FlatNetwork, error_fn: ErrorFn) -> Self {
        let flat_spot = network.act_fns().iter().map(|f| f.flat_spot()).collect();
        Self::new(flat_spot, error_fn)
    }

    pub fn flat_spot(&self) -> &[f32] {
        &self.flat_spot
    }

    pub fn error_fn(&self) -> ErrorFn {
        self.error_fn
    }

    /// Checks that there is exactly one flat spot per layer of `network`.
    pub fn ensure_fits(&self, network: &FlatNetwork) -> Result<(), MlError> {
        if self.flat_spot.len() != network.layer_count() {
            return Err(MlError::ShapeMismatch {
                what: "flat spot",
                got: self.flat_spot.len(),
                expected: network.layer_count(),
            });
        }

        Ok(())
    }
}
