use crate::error::{Result, ensure_len};

/// The error functions used to seed the output layer's deltas.
///
/// The produced signal points from the actual output towards the target, so the accumulated
/// gradient is the direction in which the weights should move to reduce the error.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ErrorFn {
    /// `target - actual`, the squared error gradient up to a constant factor.
    #[default]
    Linear,
    /// `atan(target - actual)`, dampens the effect of outliers.
    Atan,
}

impl ErrorFn {
    /// Writes the raw error signal of every output neuron into `out`.
    ///
    /// # Arguments
    /// * `target` - The expected output.
    /// * `actual` - The network's output.
    /// * `out` - The buffer where the signal is written, usually the head of the delta buffer.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if the three slices don't have the same length.
    pub fn signal(&self, target: &[f32], actual: &[f32], out: &mut [f32]) -> Result<()> {
        ensure_len("target", target.len(), actual.len())?;
        ensure_len("error signal", out.len(), actual.len())?;

        let it = out.iter_mut().zip(target.iter().zip(actual));

        match self {
            ErrorFn::Linear => it.for_each(|(e, (t, a))| *e = t - a),
            ErrorFn::Atan => it.for_each(|(e, (t, a))| *e = (t - a).atan()),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MlError;

    #[test]
    fn linear_signal_is_the_difference() {
        let mut out = [0.0; 2];
        ErrorFn::Linear
            .signal(&[1.0, 0.0], &[0.25, 0.5], &mut out)
            .unwrap();
        assert_eq!(out, [0.75, -0.5]);
    }

    #[test]
    fn atan_signal_dampens_large_errors() {
        let mut out = [0.0; 1];
        ErrorFn::Atan.signal(&[100.0], &[0.0], &mut out).unwrap();
        assert!(out[0] < std::f32::consts::FRAC_PI_2);
        assert!(out[0] > 1.5);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut out = [0.0; 2];
        let err = ErrorFn::Linear
            .signal(&[1.0], &[0.0, 0.0], &mut out)
            .unwrap_err();

        assert_eq!(
            err,
            MlError::ShapeMismatch {
                what: "target",
                got: 1,
                expected: 2
            }
        );
    }
}
