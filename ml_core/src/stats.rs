use crate::error::{Result, ensure_len};

/// Running root-mean-square error statistic.
///
/// Keeps the sum of the squared, significance weighted, errors and the amount of output values
/// that contributed to it. It is not synchronized: concurrent computations should each own an
/// accumulator and [`merge`](ErrorAccumulator::merge) them afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErrorAccumulator {
    sum: f64,
    count: usize,
}

impl ErrorAccumulator {
    /// Creates a new empty `ErrorAccumulator`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the accumulated statistic.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Accumulates the error of a single example.
    ///
    /// # Arguments
    /// * `actual` - The network's output.
    /// * `target` - The expected output.
    /// * `significance` - The example's weight, scales every output's error.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if `actual` and `target` have different lengths.
    pub fn update(&mut self, actual: &[f32], target: &[f32], significance: f32) -> Result<()> {
        ensure_len("target", target.len(), actual.len())?;

        let significance = f64::from(significance);

        for (&a, &t) in actual.iter().zip(target) {
            let delta = (f64::from(t) - f64::from(a)) * significance;
            self.sum += delta * delta;
        }

        self.count += target.len();
        Ok(())
    }

    /// Adds the statistic of `other` to this one.
    pub fn merge(&mut self, other: &ErrorAccumulator) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Returns the root-mean-square error, `0.0` if nothing was accumulated yet.
    pub fn calculate(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }

        (self.sum / self.count as f64).sqrt()
    }

    /// The sum of the squared errors.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// The amount of output values accumulated.
    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_accumulator_has_no_error() {
        assert_eq!(ErrorAccumulator::new().calculate(), 0.0);
    }

    #[test]
    fn rms_of_known_values() {
        let mut acc = ErrorAccumulator::new();
        acc.update(&[1.0], &[4.0], 1.0).unwrap();
        acc.update(&[0.0], &[0.0], 1.0).unwrap();

        assert_eq!(acc.sum(), 9.0);
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.calculate(), 4.5f64.sqrt());
    }

    #[test]
    fn significance_scales_the_error() {
        let mut acc = ErrorAccumulator::new();
        acc.update(&[0.0, 0.0], &[1.0, 1.0], 2.0).unwrap();

        assert_eq!(acc.sum(), 8.0);
        assert_eq!(acc.count(), 2);
    }

    #[test]
    fn merge_combines_sums_and_counts() {
        let mut a = ErrorAccumulator::new();
        let mut b = ErrorAccumulator::new();
        let mut whole = ErrorAccumulator::new();

        a.update(&[0.0], &[3.0], 1.0).unwrap();
        b.update(&[0.0, 0.0], &[1.0, 1.0], 1.0).unwrap();
        whole.update(&[0.0], &[3.0], 1.0).unwrap();
        whole.update(&[0.0, 0.0], &[1.0, 1.0], 1.0).unwrap();

        a.merge(&b);
        assert_eq!(a, whole);
        // not the mean of both partial errors
        assert_ne!(a.calculate(), (3.0 + 1.0) / 2.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut acc = ErrorAccumulator::new();
        acc.update(&[0.0], &[1.0], 1.0).unwrap();
        acc.reset();
        assert_eq!(acc, ErrorAccumulator::new());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut acc = ErrorAccumulator::new();
        assert!(acc.update(&[0.0], &[1.0, 2.0], 1.0).is_err());
        assert_eq!(acc.count(), 0);
    }
}
