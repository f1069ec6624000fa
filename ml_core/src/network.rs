use crate::{
    activation::ActFn,
    error::{MlError, Result, ensure_len},
};

/// The output value of every bias neuron.
pub const BIAS_ACTIVATION: f32 = 1.0;

/// Describes a single layer of a feed-forward network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSpec {
    /// The amount of neurons that feed the next layer, bias excluded.
    pub neurons: usize,
    /// The activation applied to the layer's sums, unused for the input layer.
    pub act_fn: ActFn,
    /// Whether a bias neuron is appended to this layer, must be `false` for the output layer.
    pub bias: bool,
}

impl LayerSpec {
    /// Creates a new `LayerSpec`.
    pub fn new(neurons: usize, act_fn: ActFn, bias: bool) -> Self {
        Self {
            neurons,
            act_fn,
            bias,
        }
    }
}

/// A feed-forward network whose weights and per-layer metadata live in flat buffers.
///
/// Layers are stored input first. For the layer boundary `l -> l + 1`, the weight connecting
/// neuron `y` of layer `l` to neuron `x` of layer `l + 1` is found at
/// `weight_index[l] + x * layer_counts[l] + y`.
///
/// The network holds no per-computation state: the sums and outputs of a forward pass are
/// written into a [`Scratch`] owned by the caller, so a single network can be shared by any
/// amount of concurrent computations.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatNetwork {
    weights: Vec<f32>,
    layer_counts: Vec<usize>,
    layer_feed_counts: Vec<usize>,
    layer_index: Vec<usize>,
    weight_index: Vec<usize>,
    act_fns: Vec<ActFn>,
    neurons: usize,
}

impl FlatNetwork {
    /// Creates a new `FlatNetwork` with every weight set to zero.
    ///
    /// # Arguments
    /// * `layers` - The layers of the network, input layer first.
    ///
    /// # Returns
    /// The network or an `InvalidTopology` error if there are less than two layers, a layer
    /// without neurons or a bias on the output layer.
    pub fn new(layers: &[LayerSpec]) -> Result<Self> {
        if layers.len() < 2 {
            return Err(MlError::InvalidTopology(format!(
                "a network needs at least an input and an output layer, got {} layer(s)",
                layers.len()
            )));
        }

        let last = layers.len() - 1;

        if let Some(i) = layers.iter().position(|l| l.neurons == 0) {
            return Err(MlError::InvalidTopology(format!("layer {i} has no neurons")));
        }

        if layers[last].bias {
            return Err(MlError::InvalidTopology(
                "the output layer can't have a bias neuron".into(),
            ));
        }

        let layer_feed_counts: Vec<_> = layers.iter().map(|l| l.neurons).collect();
        let layer_counts: Vec<_> = layers
            .iter()
            .map(|l| l.neurons + usize::from(l.bias))
            .collect();

        let mut layer_index = Vec::with_capacity(layers.len());
        let mut weight_index = Vec::with_capacity(layers.len());
        let mut neurons = 0;
        let mut nweights = 0;

        for l in 0..layers.len() {
            layer_index.push(neurons);
            weight_index.push(nweights);
            neurons += layer_counts[l];

            if l < last {
                nweights += layer_counts[l] * layer_feed_counts[l + 1];
            }
        }

        Ok(Self {
            weights: vec![0.; nweights],
            act_fns: layers.iter().map(|l| l.act_fn).collect(),
            layer_counts,
            layer_feed_counts,
            layer_index,
            weight_index,
            neurons,
        })
    }

    /// Creates a new `FlatNetwork` and loads the given weights into it.
    ///
    /// # Returns
    /// The network or an error if the topology is invalid or `weights` has the wrong length.
    pub fn with_weights(layers: &[LayerSpec], weights: &[f32]) -> Result<Self> {
        let mut network = Self::new(layers)?;
        network.set_weights(weights)?;
        Ok(network)
    }

    /// Replaces the network's weights in place.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if `weights` doesn't have exactly one value per connection.
    pub fn set_weights(&mut self, weights: &[f32]) -> Result<()> {
        ensure_len("weights", weights.len(), self.weights.len())?;
        self.weights.copy_from_slice(weights);
        Ok(())
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    pub fn layer_count(&self) -> usize {
        self.layer_counts.len()
    }

    /// Neurons per layer, bias included.
    pub fn layer_counts(&self) -> &[usize] {
        &self.layer_counts
    }

    /// Neurons per layer, bias excluded.
    pub fn layer_feed_counts(&self) -> &[usize] {
        &self.layer_feed_counts
    }

    /// Offset of every layer into the flat sums and outputs buffers.
    pub fn layer_index(&self) -> &[usize] {
        &self.layer_index
    }

    /// Offset of the connections leaving every layer into the weights buffer.
    pub fn weight_index(&self) -> &[usize] {
        &self.weight_index
    }

    pub fn act_fns(&self) -> &[ActFn] {
        &self.act_fns
    }

    /// The total amount of neurons, bias neurons included.
    pub fn neuron_count(&self) -> usize {
        self.neurons
    }

    pub fn input_count(&self) -> usize {
        self.layer_feed_counts[0]
    }

    pub fn output_count(&self) -> usize {
        self.layer_feed_counts[self.layer_count() - 1]
    }

    /// Returns the position in the weights buffer of the connection from neuron `from` of
    /// layer `layer` to neuron `to` of layer `layer + 1`.
    pub fn weight_offset(&self, layer: usize, from: usize, to: usize) -> usize {
        self.weight_index[layer] + to * self.layer_counts[layer] + from
    }

    /// Allocates a new scratch buffer sized for this network, with every bias neuron's output
    /// already set.
    pub fn scratch(&self) -> Scratch {
        let mut outputs = vec![0.; self.neurons];

        for l in 0..self.layer_count() {
            let start = self.layer_index[l] + self.layer_feed_counts[l];
            let end = self.layer_index[l] + self.layer_counts[l];
            outputs[start..end].fill(BIAS_ACTIVATION);
        }

        Scratch {
            sums: vec![0.; self.neurons],
            outputs,
        }
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `input` - The values of the input layer.
    /// * `scratch` - The caller's scratch, receives every neuron's sum and output.
    /// * `output` - Receives the output layer's values.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if any of the buffers doesn't fit this network.
    pub fn compute(&self, input: &[f32], scratch: &mut Scratch, output: &mut [f32]) -> Result<()> {
        ensure_len("input", input.len(), self.input_count())?;
        ensure_len("output", output.len(), self.output_count())?;
        ensure_len("scratch", scratch.outputs.len(), self.neurons)?;

        let input_start = self.layer_index[0];
        scratch.outputs[input_start..input_start + input.len()].copy_from_slice(input);

        for l in 0..self.layer_count() - 1 {
            self.compute_layer(l, scratch);
        }

        let output_start = self.layer_index[self.layer_count() - 1];
        output.copy_from_slice(&scratch.outputs[output_start..output_start + output.len()]);

        Ok(())
    }

    /// Feeds the outputs of layer `l` into the sums and outputs of layer `l + 1`.
    fn compute_layer(&self, l: usize, scratch: &mut Scratch) {
        let from_index = self.layer_index[l];
        let from_size = self.layer_counts[l];
        let to_index = self.layer_index[l + 1];
        let to_size = self.layer_feed_counts[l + 1];
        let act_fn = self.act_fns[l + 1];

        let start = self.weight_index[l];
        let weights = &self.weights[start..start + from_size * to_size];

        let (lower, upper) = scratch.outputs.split_at_mut(to_index);
        let inputs = &lower[from_index..from_index + from_size];
        let sums = &mut scratch.sums[to_index..to_index + to_size];

        for ((row, sum), out) in weights.chunks_exact(from_size).zip(sums).zip(upper) {
            *sum = row.iter().zip(inputs).map(|(w, o)| w * o).sum();
            *out = act_fn.f(*sum);
        }
    }
}

/// Per-computation buffers of a forward pass: the pre-activation sum and the output of every
/// neuron of a network, laid out following the network's `layer_index`.
///
/// Each concurrent computation must own its scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct Scratch {
    sums: Vec<f32>,
    outputs: Vec<f32>,
}

impl Scratch {
    pub fn sums(&self) -> &[f32] {
        &self.sums
    }

    pub fn outputs(&self) -> &[f32] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_three_one() -> FlatNetwork {
        FlatNetwork::new(&[
            LayerSpec::new(2, ActFn::Linear, true),
            LayerSpec::new(3, ActFn::Linear, true),
            LayerSpec::new(1, ActFn::Linear, false),
        ])
        .unwrap()
    }

    #[test]
    fn layout_is_consistent() {
        let net = two_three_one();

        assert_eq!(net.layer_counts(), [3, 4, 1]);
        assert_eq!(net.layer_feed_counts(), [2, 3, 1]);
        assert_eq!(net.layer_index(), [0, 3, 7]);
        assert_eq!(net.weight_index(), [0, 9, 13]);
        assert_eq!(net.weights().len(), 13);
        assert_eq!(net.neuron_count(), 8);

        for l in 0..net.layer_count() - 1 {
            let last = net.weight_offset(
                l,
                net.layer_counts()[l] - 1,
                net.layer_feed_counts()[l + 1] - 1,
            );
            assert_eq!(last + 1, net.weight_index()[l + 1]);
        }
    }

    #[test]
    fn scratch_presets_bias_outputs() {
        let net = two_three_one();
        let scratch = net.scratch();

        assert_eq!(scratch.outputs(), [0., 0., 1., 0., 0., 0., 1., 0.]);
        assert_eq!(scratch.sums(), [0.; 8]);
    }

    #[test]
    fn forward_pass_with_bias() {
        let mut net = two_three_one();
        // hidden x <- (in0, in1, bias)
        let hidden = [1., 0., 0., 0., 1., 0., 1., 1., 1.];
        // out <- (h0, h1, h2, bias)
        let output = [1., 2., 3., 0.5];
        let weights: Vec<f32> = hidden.iter().chain(&output).copied().collect();
        net.set_weights(&weights).unwrap();

        let mut scratch = net.scratch();
        let mut out = [0.];
        net.compute(&[2., 3.], &mut scratch, &mut out).unwrap();

        // hidden = [2, 3, 6], out = 2 + 6 + 18 + 0.5
        assert_eq!(&scratch.outputs()[3..6], [2., 3., 6.]);
        assert_eq!(out, [26.5]);
        assert_eq!(scratch.sums()[7], 26.5);
    }

    #[test]
    fn activation_is_applied_to_sums() {
        let net = FlatNetwork::with_weights(
            &[
                LayerSpec::new(1, ActFn::Linear, false),
                LayerSpec::new(1, ActFn::Sigmoid, false),
            ],
            &[0.],
        )
        .unwrap();

        let mut scratch = net.scratch();
        let mut out = [0.];
        net.compute(&[5.], &mut scratch, &mut out).unwrap();

        assert_eq!(scratch.sums()[1], 0.);
        assert_eq!(out, [0.5]);
    }

    #[test]
    fn separate_scratches_do_not_interfere() {
        let net = FlatNetwork::with_weights(
            &[
                LayerSpec::new(2, ActFn::Linear, false),
                LayerSpec::new(1, ActFn::Linear, false),
            ],
            &[1., 1.],
        )
        .unwrap();

        let mut a = net.scratch();
        let mut b = net.scratch();
        let mut out_a = [0.];
        let mut out_b = [0.];

        net.compute(&[1., 2.], &mut a, &mut out_a).unwrap();
        net.compute(&[10., 20.], &mut b, &mut out_b).unwrap();

        assert_eq!(out_a, [3.]);
        assert_eq!(out_b, [30.]);
        assert_eq!(a.outputs(), [1., 2., 3.]);
    }

    #[test]
    fn input_width_mismatch_is_a_shape_error() {
        let net = two_three_one();
        let mut scratch = net.scratch();
        let mut out = [0.];

        let err = net.compute(&[1.], &mut scratch, &mut out).unwrap_err();
        assert_eq!(
            err,
            MlError::ShapeMismatch {
                what: "input",
                got: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn scratch_of_another_topology_is_rejected() {
        let net = two_three_one();
        let other = FlatNetwork::new(&[
            LayerSpec::new(2, ActFn::Linear, false),
            LayerSpec::new(1, ActFn::Linear, false),
        ])
        .unwrap();

        let mut scratch = other.scratch();
        let mut out = [0.];
        assert!(net.compute(&[1., 2.], &mut scratch, &mut out).is_err());
    }

    #[test]
    fn invalid_topologies_are_rejected() {
        assert!(FlatNetwork::new(&[LayerSpec::new(2, ActFn::Linear, false)]).is_err());
        assert!(
            FlatNetwork::new(&[
                LayerSpec::new(2, ActFn::Linear, false),
                LayerSpec::new(0, ActFn::Linear, false),
            ])
            .is_err()
        );
        assert!(
            FlatNetwork::new(&[
                LayerSpec::new(2, ActFn::Linear, false),
                LayerSpec::new(1, ActFn::Linear, true),
            ])
            .is_err()
        );
    }

    #[test]
    fn wrong_weight_count_is_rejected() {
        let mut net = two_three_one();
        assert!(net.set_weights(&[0.; 12]).is_err());
    }
}
