use std::ops::Range;

use log::debug;
use ml_core::{ErrorAccumulator, FlatNetwork, SampleSource};
use parking_lot::Mutex;

use crate::{
    config::WorkerConfig,
    error::{Result, WorkerErr},
    interleave::{Interleave, Source, Sources},
    metrics::RoundStats,
    state::WorkerState,
};

/// The global indices a worker visits, half-open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub train: Range<usize>,
    pub validation: Range<usize>,
}

impl Partition {
    pub fn new(train: Range<usize>, validation: Range<usize>) -> Self {
        Self { train, validation }
    }
}

/// The outcome of a worker's gradient round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutput<'a> {
    /// The gradients accumulated over the whole training range.
    pub gradients: &'a [f64],
    pub error: ErrorAccumulator,
    pub stats: RoundStats,
}

/// Computes the weight gradients and the error of a flat network over a partition of the
/// examples.
///
/// The network is only read, every buffer the computation writes to is owned by the worker,
/// so any amount of workers can run a round over the same network concurrently.
#[derive(Debug)]
pub struct GradientWorker {
    id: usize,
    partition: Partition,
    config: WorkerConfig,
    state: WorkerState,
}

impl GradientWorker {
    /// Creates a new `GradientWorker`.
    ///
    /// # Args
    /// * `id` - Identifier used for observability.
    /// * `partition` - The ranges this worker visits.
    /// * `config` - The worker's numeric settings.
    /// * `state` - The worker's buffers.
    ///
    /// # Returns
    /// A new worker instance.
    pub fn new(id: usize, partition: Partition, config: WorkerConfig, state: WorkerState) -> Self {
        Self {
            id,
            partition,
            config,
            state,
        }
    }

    /// Creates a new `GradientWorker` with buffers sized for `network`.
    pub fn for_network(
        id: usize,
        partition: Partition,
        config: WorkerConfig,
        network: &FlatNetwork,
    ) -> Self {
        Self::new(id, partition, config, WorkerState::new(network))
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// The gradients of the last round, all zero if it failed.
    pub fn gradients(&self) -> &[f64] {
        &self.state.gradients
    }

    /// The error accumulated during the last round, empty if it failed.
    pub fn error(&self) -> &ErrorAccumulator {
        &self.state.error
    }

    /// Runs a forward and backward pass for every index of the training range.
    ///
    /// # Args
    /// * `network` - The weights snapshot of this round.
    /// * `sources` - The dataset, locked only while fetching a record.
    /// * `interleave` - How indices are routed between training and validation records.
    ///
    /// # Returns
    /// The gradients, error and read statistics of the whole range.
    ///
    /// # Errors
    /// Returns `WorkerErr` if the buffers don't fit `network`, before any record is read, or
    /// if a record can't be fetched or processed. No partial result is returned: the
    /// gradients and the error are cleared on failure.
    pub fn run_round<S: SampleSource>(
        &mut self,
        network: &FlatNetwork,
        sources: &Mutex<Sources<S>>,
        interleave: Interleave,
    ) -> Result<RoundOutput<'_>> {
        let stats = match self.accumulate(network, sources, interleave) {
            Ok(stats) => stats,
            Err(e) => {
                self.state.clear();
                return Err(e);
            }
        };

        Ok(RoundOutput {
            gradients: &self.state.gradients,
            error: self.state.error,
            stats,
        })
    }

    /// Accumulates the gradients and the error of the whole training range into the state.
    fn accumulate<S: SampleSource>(
        &mut self,
        network: &FlatNetwork,
        sources: &Mutex<Sources<S>>,
        interleave: Interleave,
    ) -> Result<RoundStats> {
        self.config.ensure_fits(network)?;
        self.state.ensure_fits(network)?;

        self.state.clear();
        let mut stats = RoundStats::default();

        let range = self.partition.train.clone();
        debug!(worker_id = self.id, start = range.start, end = range.end; "starting gradient round");

        for i in range {
            let route = sources
                .lock()
                .fetch(i, Source::Training, interleave, &mut self.state.record)
                .map_err(|source| WorkerErr::Data { index: i, source })?;

            stats.bump(route.source);
            self.process(network)?;
        }

        debug!(
            worker_id = self.id,
            training = stats.training,
            validation = stats.validation;
            "gradient round finished"
        );

        Ok(stats)
    }

    /// Runs a forward pass for every index of the validation range, accumulating only the
    /// error. Routing is mirrored: validation records are primary.
    ///
    /// # Returns
    /// The error accumulated over the validation range.
    ///
    /// # Errors
    /// Returns `WorkerErr` if the buffers don't fit `network` or a record can't be fetched.
    pub fn compute_error<S: SampleSource>(
        &mut self,
        network: &FlatNetwork,
        sources: &Mutex<Sources<S>>,
        interleave: Interleave,
    ) -> Result<ErrorAccumulator> {
        self.config.ensure_fits(network)?;
        self.state.ensure_fits(network)?;

        let mut error = ErrorAccumulator::new();
        let state = &mut self.state;

        for i in self.partition.validation.clone() {
            sources
                .lock()
                .fetch(i, Source::Validation, interleave, &mut state.record)
                .map_err(|source| WorkerErr::Data { index: i, source })?;

            network.compute(&state.record.input, &mut state.scratch, &mut state.actual)?;
            error.update(&state.actual, &state.record.target, state.record.significance)?;
        }

        debug!(worker_id = self.id, error = error.calculate(); "validation pass finished");
        Ok(error)
    }

    /// Accumulates the gradients of the example held in the record buffer.
    fn process(&mut self, network: &FlatNetwork) -> Result<()> {
        let WorkerState {
            actual,
            layer_delta,
            scratch,
            record,
            error,
            ..
        } = &mut self.state;

        network.compute(&record.input, scratch, actual)?;
        error.update(actual, &record.target, record.significance)?;

        let last = network.layer_count() - 1;
        let out_index = network.layer_index()[last];
        let out_delta = &mut layer_delta[out_index..out_index + actual.len()];

        self.config
            .error_fn()
            .signal(&record.target, actual, out_delta)?;

        let act_fn = network.act_fns()[last];
        let flat_spot = self.config.flat_spot()[last];
        let sums = &scratch.sums()[out_index..];

        for ((delta, &sum), &out) in out_delta.iter_mut().zip(sums).zip(actual.iter()) {
            *delta *= (act_fn.df(sum, out) + flat_spot) * record.significance;
        }

        for l in (0..last).rev() {
            self.process_level(network, l);
        }

        Ok(())
    }

    /// Accumulates the gradients of the connections leaving layer `l` and propagates the
    /// error terms of layer `l + 1` back into layer `l`.
    fn process_level(&mut self, network: &FlatNetwork, l: usize) {
        let from_index = network.layer_index()[l];
        let from_size = network.layer_counts()[l];
        let to_index = network.layer_index()[l + 1];
        let to_size = network.layer_feed_counts()[l + 1];
        let act_fn = network.act_fns()[l];
        let flat_spot = self.config.flat_spot()[l];
        let start = network.weight_index()[l];

        let weights = network.weights();
        let sums = self.state.scratch.sums();
        let outputs = self.state.scratch.outputs();
        let gradients = &mut self.state.gradients;

        let (lower, upper) = self.state.layer_delta.split_at_mut(to_index);
        let to_delta = &upper[..to_size];
        let from_delta = &mut lower[from_index..from_index + from_size];

        for (y, delta) in from_delta.iter_mut().enumerate() {
            let out = outputs[from_index + y];
            let mut sum = 0.0;

            for (x, &d) in to_delta.iter().enumerate() {
                let wi = start + x * from_size + y;
                gradients[wi] += f64::from(out) * f64::from(d);
                sum += weights[wi] * d;
            }

            *delta = sum * (act_fn.df(sums[from_index + y], out) + flat_spot);
        }
    }
}
