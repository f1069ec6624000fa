use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnConfig {
    Linear,
    Sigmoid,
    Tanh,
    Relu,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamGenConfig {
    Const { value: f32 },
    Uniform { low: f32, high: f32 },
    Xavier,
}

/// A single layer, input layer first. The activation defaults to linear.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LayerConfig {
    pub neurons: usize,
    #[serde(default)]
    pub act_fn: Option<ActFnConfig>,
    #[serde(default)]
    pub bias: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelConfig {
    Sequential {
        layers: Vec<LayerConfig>,
        init: ParamGenConfig,
    },
}
