use serde::Serialize;
use std::cmp::Ordering;

use super::config::{Weights, DEFAULT_INVERSION_SCALE};
use crate::roster::types::Firm;

/// Weighted contribution of each metric to a firm's score
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ScoreBreakdown {
    pub cycle_time: f64, // wc * (scale - cycle time)
    pub win_rate: f64,   // ww * win rate
    pub cost: f64,       // wk * (scale - cost)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ScoreResult {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Firm metrics formatted for cards and tables
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DisplayMetrics {
    pub win_rate: String,   // "60.0%"
    pub cost: String,       // "$4K"
    pub cycle_time: String, // "5 Days"
}

/// Missing metrics render as "n/a" rather than a made-up zero
fn display_metric(value: f64, render: impl FnOnce(f64) -> String) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        render(value)
    }
}

impl DisplayMetrics {
    pub fn for_firm(firm: &Firm) -> Self {
        Self {
            win_rate: display_metric(firm.win_rate, |v| format!("{:.1}%", round_to_tenth(v * 100.0))),
            cost: display_metric(firm.cost_per_case, |v| format!("${}K", v.trunc() as i64)),
            cycle_time: display_metric(firm.cycle_time, |v| format!("{} Days", v.trunc() as i64)),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub firm: Firm,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub display: DisplayMetrics,
}

/// NaN scores (from NaN metrics) rank below every real score
fn rank_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Score one firm: `wc*(scale - cycle) + ww*win + wk*(scale - cost)`.
///
/// Weights are used as given, so out-of-range values scale the result linearly.
pub fn score_firm(firm: &Firm, weights: &Weights, scale: f64) -> ScoreResult {
    let breakdown = ScoreBreakdown {
        cycle_time: weights.cycle_time * (scale - firm.cycle_time),
        win_rate: weights.win_rate * firm.win_rate,
        cost: weights.cost * (scale - firm.cost_per_case),
    };

    ScoreResult {
        score: breakdown.cycle_time + breakdown.win_rate + breakdown.cost,
        breakdown,
    }
}

/// Recommend up to `top_k` firms from `cluster_id` that serve `jurisdiction`,
/// using the standard inversion scale of 10.
///
/// Never fails: an unknown cluster or jurisdiction yields an empty list.
pub fn recommend_firms(
    roster: &[Firm],
    cluster_id: &str,
    jurisdiction: &str,
    weights: &Weights,
    top_k: usize,
) -> Vec<Recommendation> {
    recommend_firms_with_scale(
        roster,
        cluster_id,
        jurisdiction,
        weights,
        top_k,
        DEFAULT_INVERSION_SCALE,
    )
}

/// Same as [`recommend_firms`] with an explicit inversion scale.
pub fn recommend_firms_with_scale(
    roster: &[Firm],
    cluster_id: &str,
    jurisdiction: &str,
    weights: &Weights,
    top_k: usize,
    scale: f64,
) -> Vec<Recommendation> {
    let in_cluster: Vec<&Firm> = roster.iter().filter(|f| f.cluster == cluster_id).collect();
    let eligible: Vec<&Firm> = in_cluster
        .iter()
        .copied()
        .filter(|f| f.serves(jurisdiction))
        .collect();

    tracing::debug!(
        cluster = cluster_id,
        jurisdiction,
        roster = roster.len(),
        in_cluster = in_cluster.len(),
        eligible = eligible.len(),
        "filtered firm roster"
    );

    let mut scored: Vec<(&Firm, ScoreResult)> = eligible
        .into_iter()
        .map(|firm| (firm, score_firm(firm, weights, scale)))
        .collect();

    // Stable sort: equal scores keep roster order
    scored.sort_by(|a, b| {
        rank_key(b.1.score)
            .partial_cmp(&rank_key(a.1.score))
            .unwrap_or(Ordering::Equal)
    });

    scored
        .into_iter()
        .take(top_k)
        .map(|(firm, result)| Recommendation {
            firm: firm.clone(),
            score: result.score,
            breakdown: result.breakdown,
            display: DisplayMetrics::for_firm(firm),
        })
        .collect()
}
