use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFnConfig {
    #[default]
    Linear,
    Atan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetConfig {
    /// Row-major records of `x_size` inputs followed by `y_size` targets.
    Inline {
        data: Vec<f32>,
        x_size: usize,
        y_size: usize,
        #[serde(default)]
        significance: Option<Vec<f32>>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    pub workers: usize,
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub validation: Option<DatasetConfig>,
    /// Routes one index in four to the other source, requires a validation dataset.
    #[serde(default)]
    pub cross_validation: bool,
    #[serde(default)]
    pub error_fn: ErrorFnConfig,
    /// One value per layer, defaults to each activation's own flat spot.
    #[serde(default)]
    pub flat_spot: Option<Vec<f32>>,
    #[serde(default)]
    pub seed: Option<u64>,
}
