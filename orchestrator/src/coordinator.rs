use log::{debug, info, warn};
use ml_core::{DataError, ErrorAccumulator, FlatNetwork, SampleSource};
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use worker::{
    GradientWorker, Interleave, Partition, RoundStats, Source, Sources, WorkerConfig, WorkerErr,
};

use crate::{
    error::{OrchestratorError, Result},
    partition::partition,
};

/// The settings a `Coordinator` is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    pub workers: usize,
    pub interleave: Interleave,
    pub worker: WorkerConfig,
}

/// The merged outcome of a gradient round.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    /// The element-wise sum of every partition's gradients.
    pub gradients: Vec<f64>,
    /// The root-mean-square error over every example of the round.
    pub error: f64,
    pub stats: RoundStats,
}

/// Splits the examples among a fixed set of gradient workers, runs them in parallel and
/// merges their results.
///
/// The dataset lives behind the single lock shared by every worker, the weights are only
/// borrowed for the length of a round.
pub struct Coordinator<S: SampleSource> {
    sources: Mutex<Sources<S>>,
    workers: Vec<GradientWorker>,
    pool: ThreadPool,
    interleave: Interleave,
}

impl<S: SampleSource> Coordinator<S> {
    /// Creates a new `Coordinator`.
    ///
    /// # Arguments
    /// * `network` - The network the workers' buffers are sized for.
    /// * `sources` - The session's training and validation sources.
    /// * `config` - The coordinator's settings.
    ///
    /// # Returns
    /// The coordinator or an error if there are no workers or the pool can't be built.
    pub fn new(
        network: &FlatNetwork,
        sources: Sources<S>,
        config: CoordinatorConfig,
    ) -> Result<Self> {
        let CoordinatorConfig {
            workers: nworkers,
            interleave,
            worker: worker_config,
        } = config;

        worker_config.ensure_fits(network).map_err(|e| {
            OrchestratorError::InvalidConfig(format!("worker configuration: {e}"))
        })?;

        let train = partition(sources.len_of(Source::Training), nworkers)?;
        let validation = partition(sources.len_of(Source::Validation), nworkers)?;

        let empty = train.iter().filter(|r| r.is_empty()).count();
        if empty > 0 {
            warn!(workers = nworkers, empty = empty; "some workers have no training examples");
        }

        let workers = train
            .into_iter()
            .zip(validation)
            .enumerate()
            .map(|(id, (train, validation))| {
                GradientWorker::for_network(
                    id,
                    Partition::new(train, validation),
                    worker_config.clone(),
                    network,
                )
            })
            .collect();

        let pool = ThreadPoolBuilder::new()
            .num_threads(nworkers)
            .thread_name(|i| format!("gradient-worker-{i}"))
            .build()
            .map_err(|e| OrchestratorError::ThreadPool(e.to_string()))?;

        Ok(Self {
            sources: Mutex::new(sources),
            workers,
            pool,
            interleave,
        })
    }

    pub fn workers(&self) -> &[GradientWorker] {
        &self.workers
    }

    /// Returns whether there are validation records to compute an error over.
    pub fn has_validation(&self) -> bool {
        self.sources.lock().len_of(Source::Validation) > 0
    }

    /// Runs one gradient round over every training index.
    ///
    /// Each worker visits its own partition on the pool, the results are summed in ascending
    /// partition order so the outcome doesn't depend on scheduling.
    ///
    /// # Errors
    /// Returns `OrchestratorError::Partition` for the lowest failing partition. Nothing is
    /// merged when any partition fails.
    pub fn run_round(&mut self, network: &FlatNetwork) -> Result<Round> {
        let sources = &self.sources;
        let interleave = self.interleave;

        info!(workers = self.workers.len(); "starting gradient round");

        let outputs: Vec<_> = self.pool.install(|| {
            self.workers
                .par_iter_mut()
                .map(|worker| worker.run_round(network, sources, interleave))
                .collect()
        });

        let nweights = network.weights().len();
        let mut gradients = vec![0.0; nweights];
        let mut error = ErrorAccumulator::new();
        let mut stats = RoundStats::default();

        for (partition, output) in outputs.into_iter().enumerate() {
            let output =
                output.map_err(|source| OrchestratorError::Partition { partition, source })?;

            if output.gradients.len() != nweights {
                return Err(OrchestratorError::Partition {
                    partition,
                    source: WorkerErr::GradientLengthMismatch {
                        got: output.gradients.len(),
                        expected: nweights,
                    },
                });
            }

            for (acc, g) in gradients.iter_mut().zip(output.gradients) {
                *acc += g;
            }

            error.merge(&output.error);
            stats.merge(&output.stats);
            debug!(partition = partition, records = output.stats.records(); "merged partition");
        }

        let error = error.calculate();
        info!(error = error, records = stats.records(); "gradient round finished");

        Ok(Round {
            gradients,
            error,
            stats,
        })
    }

    /// Computes the root-mean-square error over every validation index, without gradients.
    ///
    /// # Errors
    /// Returns `OrchestratorError::Partition` for the lowest failing partition, or a data error
    /// for the first partition if there are no validation records at all.
    pub fn compute_validation_error(&mut self, network: &FlatNetwork) -> Result<f64> {
        if !self.has_validation() {
            return Err(OrchestratorError::Partition {
                partition: 0,
                source: WorkerErr::Data {
                    index: 0,
                    source: DataError::EmptySource,
                },
            });
        }

        let sources = &self.sources;
        let interleave = self.interleave;

        let outputs: Vec<_> = self.pool.install(|| {
            self.workers
                .par_iter_mut()
                .map(|worker| worker.compute_error(network, sources, interleave))
                .collect()
        });

        let mut error = ErrorAccumulator::new();

        for (partition, output) in outputs.into_iter().enumerate() {
            let output =
                output.map_err(|source| OrchestratorError::Partition { partition, source })?;
            error.merge(&output);
        }

        let error = error.calculate();
        info!(error = error; "validation pass finished");
        Ok(error)
    }
}
