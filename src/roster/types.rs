use serde::{de, Deserialize, Deserializer, Serialize};

use crate::scoring::jurisdiction::JurisdictionSet;

/// One litigation law firm from the firm dataset.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Firm {
    #[serde(rename(deserialize = "Firm Name"))]
    pub name: String,
    #[serde(rename(deserialize = "Cluster_name"))]
    pub cluster: String,
    /// Delimited state codes, e.g. "TX, OK"
    #[serde(rename(deserialize = "state_list"), default)]
    pub jurisdictions: String,
    /// Days to resolve a case (lower is better)
    #[serde(rename(deserialize = "Cycle time"), deserialize_with = "metric_or_nan")]
    pub cycle_time: f64,
    /// Favorable-outcome fraction in [0,1] (higher is better)
    #[serde(rename(deserialize = "Win rate proxy"), deserialize_with = "metric_or_nan")]
    pub win_rate: f64,
    /// Thousands per case (lower is better)
    #[serde(rename(deserialize = "Cost per case"), deserialize_with = "metric_or_nan")]
    pub cost_per_case: f64,
}

/// Blank metric cells load as NaN so the rest of the roster still ranks
fn metric_or_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>()
        .map_err(|_| de::Error::custom(format!("cannot parse float from {:?}", raw)))
}

impl Firm {
    /// Tokenized jurisdictions, or None when the field has no codes at all
    pub fn jurisdiction_set(&self) -> Option<JurisdictionSet> {
        JurisdictionSet::parse(&self.jurisdictions)
    }

    /// Whole-token jurisdiction check. Unparseable fields never match.
    pub fn serves(&self, jurisdiction: &str) -> bool {
        self.jurisdiction_set()
            .map(|set| set.contains(jurisdiction))
            .unwrap_or(false)
    }
}

/// A claim with its predicted litigation cluster.
///
/// Claims have no id column; they are addressed by row position the way the
/// dataset was produced.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Claim {
    #[serde(skip_deserializing)]
    pub index: usize,
    #[serde(rename(deserialize = "FTR_JRSDTN_ST_ABBR"))]
    pub jurisdiction: String,
    #[serde(rename(deserialize = "BODY_PART_INJD_DESC"), default)]
    pub injury: String,
    #[serde(rename(deserialize = "DEMAND"), default)]
    pub demand: String,
    #[serde(rename(deserialize = "OFFER"), default)]
    pub offer: String,
    #[serde(rename(deserialize = "Cluster_name"))]
    pub cluster: String,
    #[serde(rename(deserialize = "Firm Name"), default)]
    pub firm_name: String,
}

/// A claim row from the similarity model output.
///
/// The similar-claim columns hold list literals (`['12', '40']`, `[0.91, 0.87]`)
/// and are parsed on demand by the similar-claims explorer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SimilarityRecord {
    pub claim_id: String,
    #[serde(rename(deserialize = "Claim"), default)]
    pub claim_type: String,
    #[serde(rename(deserialize = "FTR_JRSDTN_ST_ABBR"), default)]
    pub jurisdiction: String,
    #[serde(rename(deserialize = "BODY_PART_INJD_DESC"), default)]
    pub injury: String,
    #[serde(rename(deserialize = "Law Firm Name"), default)]
    pub law_firm: String,
    #[serde(rename(deserialize = "Claim_Notes"), default)]
    pub notes: String,
    #[serde(default)]
    pub match_scope: String,
    #[serde(rename(deserialize = "top_5_similar_claim_ids"), default)]
    pub similar_ids: String,
    #[serde(rename(deserialize = "top_5_similarity_scores"), default)]
    pub similar_scores: String,
}
