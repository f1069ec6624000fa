use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::{
    error::{MlError, Result},
    network::FlatNetwork,
};

/// Generates the initial weights of a flat network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamGen {
    /// Every weight takes the same value.
    Const { value: f32 },
    /// Weights are sampled uniformly from `[low, high)`.
    Uniform { low: f32, high: f32 },
    /// Weights of each layer boundary are sampled uniformly from
    /// `[-sqrt(6 / (fan_in + fan_out)), sqrt(6 / (fan_in + fan_out))]`.
    Xavier,
}

impl ParamGen {
    /// Overwrites every weight of `network`.
    ///
    /// # Arguments
    /// * `network` - The network to initialize.
    /// * `rng` - The source of randomness, left untouched by `Const`.
    ///
    /// # Returns
    /// An `InvalidInput` error if the uniform range is empty or not finite.
    pub fn fill<R: Rng>(&self, network: &mut FlatNetwork, rng: &mut R) -> Result<()> {
        match *self {
            ParamGen::Const { value } => network.weights_mut().fill(value),
            ParamGen::Uniform { low, high } => {
                let dist = Uniform::new(low, high)
                    .map_err(|_| MlError::InvalidInput("invalid uniform range"))?;

                network
                    .weights_mut()
                    .iter_mut()
                    .for_each(|w| *w = dist.sample(rng));
            }
            ParamGen::Xavier => {
                for l in 0..network.layer_count() - 1 {
                    let fan_in = network.layer_counts()[l];
                    let fan_out = network.layer_feed_counts()[l + 1];
                    let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();

                    let dist = Uniform::new_inclusive(-limit, limit)
                        .map_err(|_| MlError::InvalidInput("invalid xavier range"))?;

                    let start = network.weight_index()[l];
                    let end = network.weight_index()[l + 1];
                    network.weights_mut()[start..end]
                        .iter_mut()
                        .for_each(|w| *w = dist.sample(rng));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{ActFn, LayerSpec};

    fn network() -> FlatNetwork {
        FlatNetwork::new(&[
            LayerSpec::new(4, ActFn::Linear, true),
            LayerSpec::new(3, ActFn::Sigmoid, true),
            LayerSpec::new(2, ActFn::Sigmoid, false),
        ])
        .unwrap()
    }

    #[test]
    fn const_fills_every_weight() {
        let mut net = network();
        ParamGen::Const { value: 0.5 }
            .fill(&mut net, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(net.weights().iter().all(|&w| w == 0.5));
    }

    #[test]
    fn uniform_stays_in_range_and_is_reproducible() {
        let param_gen = ParamGen::Uniform {
            low: -0.5,
            high: 0.5,
        };

        let mut a = network();
        let mut b = network();
        param_gen.fill(&mut a, &mut StdRng::seed_from_u64(7)).unwrap();
        param_gen.fill(&mut b, &mut StdRng::seed_from_u64(7)).unwrap();

        assert_eq!(a, b);
        assert!(a.weights().iter().all(|w| (-0.5..0.5).contains(w)));
    }

    #[test]
    fn xavier_respects_each_layer_limit() {
        let mut net = network();
        ParamGen::Xavier
            .fill(&mut net, &mut StdRng::seed_from_u64(3))
            .unwrap();

        let hidden_limit = (6.0f32 / (5 + 3) as f32).sqrt();
        let output_limit = (6.0f32 / (4 + 2) as f32).sqrt();
        let (hidden, output) = net.weights().split_at(net.weight_index()[1]);

        assert!(hidden.iter().all(|w| w.abs() <= hidden_limit));
        assert!(output.iter().all(|w| w.abs() <= output_limit));
    }

    #[test]
    fn empty_uniform_range_is_rejected() {
        let mut net = network();
        let param_gen = ParamGen::Uniform {
            low: 1.0,
            high: 1.0,
        };
        assert!(param_gen.fill(&mut net, &mut StdRng::seed_from_u64(0)).is_err());
    }
}
