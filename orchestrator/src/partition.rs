use std::ops::Range;

use crate::error::{OrchestratorError, Result};

/// Splits `total` indices among `nworkers` and returns the shard for `worker_id`, `nworkers`
/// must be non-zero.
///
/// Properties:
/// - Ranges are contiguous, disjoint and cover `[0..total)`.
/// - Sizes differ by at most 1, the first `total % nworkers` shards take the extra index.
pub fn shard_range(total: usize, worker_id: usize, nworkers: usize) -> Range<usize> {
    let base = total / nworkers;
    let rem = total % nworkers;

    let start = worker_id * base + worker_id.min(rem);
    let extra = usize::from(worker_id < rem);

    start..start + base + extra
}

/// Splits `[0..total)` into `nworkers` shards, in ascending order.
///
/// # Returns
/// The shards, trailing ones are empty when there are more workers than indices, or an
/// `InvalidConfig` error if `nworkers` is zero.
pub fn partition(total: usize, nworkers: usize) -> Result<Vec<Range<usize>>> {
    if nworkers == 0 {
        return Err(OrchestratorError::InvalidConfig(
            "at least one worker is required".into(),
        ));
    }

    Ok((0..nworkers)
        .map(|id| shard_range(total, id, nworkers))
        .collect())
}
