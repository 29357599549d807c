use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::llm::LlmConfig;
use crate::scoring::ScoringConfig;

pub const DEFAULT_FIRMS_FILE: &str = "synthetic_litigation_dataset_with_firms_and_cluster.csv";
pub const DEFAULT_CLAIMS_FILE: &str = "model_output_with_predicted_cluster.csv";
pub const DEFAULT_SIMILARITY_FILE: &str = "model_output_with_top5_claims.csv";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
    #[serde(default)]
    pub llm: Option<LlmConfig>,
}

/// Dataset locations. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    #[serde(default)]
    pub firms: Option<PathBuf>,
    #[serde(default)]
    pub claims: Option<PathBuf>,
    #[serde(default)]
    pub similar_claims: Option<PathBuf>,
}

impl DataConfig {
    pub fn firms_path(&self) -> PathBuf {
        self.firms
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FIRMS_FILE))
    }

    pub fn claims_path(&self) -> PathBuf {
        self.claims
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLAIMS_FILE))
    }

    pub fn similarity_path(&self) -> PathBuf {
        self.similar_claims
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SIMILARITY_FILE))
    }
}

impl Config {
    pub fn scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }

    pub fn llm(&self) -> LlmConfig {
        self.llm.clone().unwrap_or_default()
    }
}
