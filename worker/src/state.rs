use ml_core::{ErrorAccumulator, FlatNetwork, MlError, Record, Scratch};

use crate::error::{Result, WorkerErr};

/// Persistent buffers reused across rounds to avoid per-example allocations.
///
/// Every buffer is owned by a single worker, none of them is shared during a round.
#[derive(Debug)]
pub struct WorkerState {
    /// The network's output for the current example.
    pub actual: Vec<f32>,

    /// The error term of every neuron, laid out like the network's outputs.
    pub layer_delta: Vec<f32>,

    /// Gradient buffer (flat), parallel to the network's weights. Sums run over whole
    /// partitions, hence the wider type.
    pub gradients: Vec<f64>,

    pub scratch: Scratch,

    /// Fetch buffer for the current example.
    pub record: Record,

    pub error: ErrorAccumulator,
}

impl WorkerState {
    pub fn new(network: &FlatNetwork) -> Self {
        Self::with_gradients(network, vec![0.0; network.weights().len()])
    }

    /// Creates the state around a caller supplied gradient buffer, its length is checked
    /// every round.
    pub fn with_gradients(network: &FlatNetwork, gradients: Vec<f64>) -> Self {
        Self {
            actual: vec![0.0; network.output_count()],
            layer_delta: vec![0.0; network.neuron_count()],
            gradients,
            scratch: network.scratch(),
            record: Record::new(network.input_count(), network.output_count()),
            error: ErrorAccumulator::new(),
        }
    }

    #[inline]
    pub fn zero_grads(&mut self) {
        self.gradients.fill(0.0);
    }

    /// Zeroes the gradients and clears the error.
    pub fn clear(&mut self) {
        self.zero_grads();
        self.error.reset();
    }

    /// Checks every buffer against the network of the upcoming round.
    ///
    /// # Errors
    /// Returns `GradientLengthMismatch` for a gradient buffer of the wrong length and a
    /// `Config` error for any other buffer built for another topology.
    pub fn ensure_fits(&self, network: &FlatNetwork) -> Result<()> {
        let expected = network.weights().len();

        if self.gradients.len() != expected {
            return Err(WorkerErr::GradientLengthMismatch {
                got: self.gradients.len(),
                expected,
            });
        }

        let buffers = [
            ("actual", self.actual.len(), network.output_count()),
            ("layer delta", self.layer_delta.len(), network.neuron_count()),
            ("scratch", self.scratch.len(), network.neuron_count()),
        ];

        for (what, got, expected) in buffers {
            if got != expected {
                return Err(MlError::ShapeMismatch {
                    what,
                    got,
                    expected,
                }
                .into());
            }
        }

        Ok(())
    }
}
