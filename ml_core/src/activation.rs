/// The activation functions a flat network layer can use.
///
/// The set is closed, every kind is dispatched by a single `match`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ActFn {
    /// `f(z) = z`
    #[default]
    Linear,
    /// `f(z) = 1 / (1 + e^-z)`
    Sigmoid,
    /// `f(z) = tanh(z)`
    Tanh,
    /// `f(z) = max(0, z)`
    Relu,
}
use ActFn::*;

impl ActFn {
    /// Applies the function to a pre-activation sum.
    pub fn f(&self, z: f32) -> f32 {
        match self {
            Linear => z,
            Sigmoid => 1. / (1. + (-z).exp()),
            Tanh => z.tanh(),
            Relu => z.max(0.),
        }
    }

    /// Evaluates the derivative of the function.
    ///
    /// # Arguments
    /// * `z` - The pre-activation sum of the neuron.
    /// * `a` - The neuron's output, that is `f(z)`.
    ///
    /// # Returns
    /// The derivative at `z`, computed from whichever of the two is cheaper.
    pub fn df(&self, z: f32, a: f32) -> f32 {
        match self {
            Linear => 1.,
            Sigmoid => a * (1. - a),
            Tanh => 1. - a * a,
            Relu => {
                if z > 0. {
                    1.
                } else {
                    0.
                }
            }
        }
    }

    /// Returns the default flat spot constant for this function.
    ///
    /// Non-zero only for the sigmoid.
    pub fn flat_spot(&self) -> f32 {
        match self {
            Sigmoid => 0.1,
            Linear | Tanh | Relu => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_is_identity_with_unit_derivative() {
        assert_eq!(Linear.f(-3.5), -3.5);
        assert_eq!(Linear.df(-3.5, -3.5), 1.0);
    }

    #[test]
    fn sigmoid_derivative_uses_output() {
        let a = Sigmoid.f(0.0);
        assert_eq!(a, 0.5);
        assert_eq!(Sigmoid.df(0.0, a), 0.25);
    }

    #[test]
    fn tanh_derivative_uses_output() {
        let a = Tanh.f(0.3);
        assert!((Tanh.df(0.3, a) - (1.0 - 0.3f32.tanh().powi(2))).abs() < 1e-6);
    }

    #[test]
    fn relu_derivative_uses_sum() {
        assert_eq!(Relu.f(-1.0), 0.0);
        assert_eq!(Relu.df(-1.0, 0.0), 0.0);
        assert_eq!(Relu.df(2.0, 2.0), 1.0);
    }

    #[test]
    fn only_sigmoid_has_a_default_flat_spot() {
        assert_eq!(Sigmoid.flat_spot(), 0.1);
        assert_eq!(Linear.flat_spot(), 0.0);
        assert_eq!(Tanh.flat_spot(), 0.0);
        assert_eq!(Relu.flat_spot(), 0.0);
    }
}
