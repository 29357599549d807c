use serde::{Deserialize, Serialize};

/// Constant that cycle time and cost are subtracted from before weighting.
///
/// Both fields are expected on a roughly 0-10 scale; reference datasets rank
/// with exactly this value.
pub const DEFAULT_INVERSION_SCALE: f64 = 10.0;

/// Number of firms recommended when nothing else is configured
pub const DEFAULT_TOP_K: usize = 3;

/// Caller-chosen coefficients for the three firm metrics.
///
/// Each is expected in [0,1] but they are independent and need not sum to 1.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    pub cycle_time: f64,
    pub win_rate: f64,
    pub cost: f64,
}

impl Weights {
    pub fn new(cycle_time: f64, win_rate: f64, cost: f64) -> Self {
        Self {
            cycle_time,
            win_rate,
            cost,
        }
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::new(0.3, 0.3, 0.3)
    }
}

/// Main scoring configuration.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   weights:
///     cycle_time: 0.3
///     win_rate: 0.5
///     cost: 0.2
///   inversion_scale: 10
///   top_k: 3
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Metric weights (default: 0.3 each)
    #[serde(default)]
    pub weights: Option<Weights>,

    /// Inversion constant for cycle time and cost (default: 10)
    #[serde(default)]
    pub inversion_scale: Option<f64>,

    /// How many firms to recommend (default: 3)
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl ScoringConfig {
    pub fn effective_weights(&self) -> Weights {
        self.weights.unwrap_or_default()
    }

    pub fn effective_scale(&self) -> f64 {
        self.inversion_scale.unwrap_or(DEFAULT_INVERSION_SCALE)
    }

    pub fn effective_top_k(&self) -> usize {
        self.top_k.unwrap_or(DEFAULT_TOP_K)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: Some(Weights::default()),
            inversion_scale: Some(DEFAULT_INVERSION_SCALE),
            top_k: Some(DEFAULT_TOP_K),
        }
    }
}
