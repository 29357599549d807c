use serde::Serialize;

use super::engine::round_to_tenth;
use crate::roster::types::Firm;

/// Averages over every firm in one cluster.
///
/// Each average skips firms whose metric is missing; it is None when no firm
/// in the cluster has a value for it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClusterSummary {
    pub cluster: String,
    pub firm_count: usize,
    pub avg_cycle_time_days: Option<i64>,
    pub avg_win_rate_pct: Option<f64>,
    pub avg_cost_thousands: Option<i64>,
}

fn finite_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Aggregate the firms sharing `cluster_id`, ignoring jurisdiction.
///
/// Returns None when no firm carries the cluster.
pub fn cluster_summary(roster: &[Firm], cluster_id: &str) -> Option<ClusterSummary> {
    let members: Vec<&Firm> = roster.iter().filter(|f| f.cluster == cluster_id).collect();
    if members.is_empty() {
        return None;
    }

    let mean = |metric: fn(&Firm) -> f64| finite_mean(members.iter().map(|f| metric(f)));

    Some(ClusterSummary {
        cluster: cluster_id.to_string(),
        firm_count: members.len(),
        avg_cycle_time_days: mean(|f| f.cycle_time).map(|v| v.round() as i64),
        avg_win_rate_pct: mean(|f| f.win_rate).map(|v| round_to_tenth(v * 100.0)),
        avg_cost_thousands: mean(|f| f.cost_per_case).map(|v| v.round() as i64),
    })
}
