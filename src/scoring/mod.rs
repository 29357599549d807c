pub mod config;
pub mod engine;
pub mod jurisdiction;
pub mod summary;
pub mod validation;

pub use config::*;
pub use engine::{
    recommend_firms, recommend_firms_with_scale, score_firm, DisplayMetrics, Recommendation,
    ScoreBreakdown, ScoreResult,
};
pub use jurisdiction::JurisdictionSet;
pub use summary::{cluster_summary, ClusterSummary};
pub use validation::{range_warnings, validate_scoring, RangeWarning};
