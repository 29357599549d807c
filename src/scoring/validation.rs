use std::fmt;

use super::config::{ScoringConfig, Weights};
use crate::roster::types::Firm;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref weights) = config.weights {
        for (name, value) in weight_fields(weights) {
            if !value.is_finite() {
                errors.push(format!("scoring.weights.{}: must be a finite number", name));
            }
        }
    }

    if let Some(scale) = config.inversion_scale {
        if !scale.is_finite() || scale <= 0.0 {
            errors.push("scoring.inversion_scale: must be a positive number".to_string());
        }
    }

    if config.top_k == Some(0) {
        errors.push("scoring.top_k: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn weight_fields(weights: &Weights) -> [(&'static str, f64); 3] {
    [
        ("cycle_time", weights.cycle_time),
        ("win_rate", weights.win_rate),
        ("cost", weights.cost),
    ]
}

/// An input the scoring formula accepts but that falls outside its expected range
#[derive(Debug, Clone, PartialEq)]
pub enum RangeWarning {
    WeightOutOfRange { weight: &'static str, value: f64 },
    CycleTimeOutOfScale { firm: String, value: f64, scale: f64 },
    CostOutOfScale { firm: String, value: f64, scale: f64 },
    WinRateOutOfRange { firm: String, value: f64 },
    MissingMetric { firm: String, metric: &'static str },
    NoJurisdictions { firm: String },
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeWarning::WeightOutOfRange { weight, value } => {
                write!(f, "weight {} = {} is outside [0, 1]", weight, value)
            }
            RangeWarning::CycleTimeOutOfScale { firm, value, scale } => {
                write!(f, "{}: cycle time {} is outside [0, {}]", firm, value, scale)
            }
            RangeWarning::CostOutOfScale { firm, value, scale } => {
                write!(f, "{}: cost per case {} is outside [0, {}]", firm, value, scale)
            }
            RangeWarning::WinRateOutOfRange { firm, value } => {
                write!(f, "{}: win rate proxy {} is outside [0, 1]", firm, value)
            }
            RangeWarning::MissingMetric { firm, metric } => {
                write!(f, "{}: {} is missing, firm ranks last", firm, metric)
            }
            RangeWarning::NoJurisdictions { firm } => {
                write!(f, "{}: no jurisdiction codes, firm never matches", firm)
            }
        }
    }
}

fn within(value: f64, low: f64, high: f64) -> bool {
    value >= low && value <= high
}

/// Flag inputs outside the ranges the inversion scale assumes.
///
/// Nothing is clamped or renormalized; callers decide what to do with these.
pub fn range_warnings(roster: &[Firm], weights: &Weights, scale: f64) -> Vec<RangeWarning> {
    let mut warnings: Vec<RangeWarning> = weight_fields(weights)
        .into_iter()
        .filter(|(_, value)| !within(*value, 0.0, 1.0))
        .map(|(weight, value)| RangeWarning::WeightOutOfRange { weight, value })
        .collect();

    for firm in roster {
        let missing = [
            ("cycle time", firm.cycle_time),
            ("win rate proxy", firm.win_rate),
            ("cost per case", firm.cost_per_case),
        ];
        for (metric, value) in missing {
            if value.is_nan() {
                warnings.push(RangeWarning::MissingMetric {
                    firm: firm.name.clone(),
                    metric,
                });
            }
        }

        if !firm.cycle_time.is_nan() && !within(firm.cycle_time, 0.0, scale) {
            warnings.push(RangeWarning::CycleTimeOutOfScale {
                firm: firm.name.clone(),
                value: firm.cycle_time,
                scale,
            });
        }
        if !firm.cost_per_case.is_nan() && !within(firm.cost_per_case, 0.0, scale) {
            warnings.push(RangeWarning::CostOutOfScale {
                firm: firm.name.clone(),
                value: firm.cost_per_case,
                scale,
            });
        }
        if !firm.win_rate.is_nan() && !within(firm.win_rate, 0.0, 1.0) {
            warnings.push(RangeWarning::WinRateOutOfRange {
                firm: firm.name.clone(),
                value: firm.win_rate,
            });
        }
        if firm.jurisdiction_set().is_none() {
            warnings.push(RangeWarning::NoJurisdictions {
                firm: firm.name.clone(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firm(name: &str, states: &str, cycle: f64, win: f64, cost: f64) -> Firm {
        Firm {
            name: name.to_string(),
            cluster: "X".to_string(),
            jurisdictions: states.to_string(),
            cycle_time: cycle,
            win_rate: win,
            cost_per_case: cost,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_config() {
        let config = ScoringConfig {
            weights: None,
            inversion_scale: None,
            top_k: None,
        };
        assert!(validate_scoring(&config).is_ok());
    }

    #[test]
    fn test_out_of_range_weight_is_not_an_error() {
        let config = ScoringConfig {
            weights: Some(Weights::new(2.0, -1.0, 0.5)),
            inversion_scale: None,
            top_k: None,
        };
        assert!(validate_scoring(&config).is_ok());
    }

    #[test]
    fn test_non_finite_weight() {
        let config = ScoringConfig {
            weights: Some(Weights::new(f64::NAN, 0.3, f64::INFINITY)),
            inversion_scale: None,
            top_k: None,
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("scoring.weights.cycle_time"));
        assert!(errors[1].contains("scoring.weights.cost"));
    }

    #[test]
    fn test_collects_all_errors() {
        let config = ScoringConfig {
            weights: None,
            inversion_scale: Some(0.0), // Error 1
            top_k: Some(0),             // Error 2
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("inversion_scale"));
        assert!(errors[1].contains("top_k"));
    }

    #[test]
    fn test_range_warnings_clean_roster() {
        let roster = vec![firm("A", "TX", 5.0, 0.6, 4.0)];
        assert!(range_warnings(&roster, &Weights::default(), 10.0).is_empty());
    }

    #[test]
    fn test_range_warnings_flags_raw_days() {
        // Cycle time in raw days instead of the 0-10 scale
        let roster = vec![firm("Slow LLP", "TX", 180.0, 0.6, 4.0)];
        let warnings = range_warnings(&roster, &Weights::default(), 10.0);
        assert_eq!(
            warnings,
            vec![RangeWarning::CycleTimeOutOfScale {
                firm: "Slow LLP".to_string(),
                value: 180.0,
                scale: 10.0,
            }]
        );
        assert!(warnings[0].to_string().contains("outside [0, 10]"));
    }

    #[test]
    fn test_range_warnings_weights_and_firm_fields() {
        let roster = vec![firm("Odd", "", 5.0, 1.4, -2.0)];
        let warnings = range_warnings(&roster, &Weights::new(1.5, 0.3, 0.3), 10.0);
        assert_eq!(warnings.len(), 4);
        assert!(matches!(
            warnings[0],
            RangeWarning::WeightOutOfRange { weight: "cycle_time", .. }
        ));
        assert!(matches!(warnings[1], RangeWarning::CostOutOfScale { .. }));
        assert!(matches!(warnings[2], RangeWarning::WinRateOutOfRange { .. }));
        assert!(matches!(warnings[3], RangeWarning::NoJurisdictions { .. }));
    }

    #[test]
    fn test_range_warnings_missing_metrics() {
        let roster = vec![
            firm("Blank", "TX", f64::NAN, 0.5, f64::NAN),
            firm("Fine", "TX", 5.0, 0.6, 4.0),
        ];
        let warnings = range_warnings(&roster, &Weights::default(), 10.0);
        assert_eq!(
            warnings,
            vec![
                RangeWarning::MissingMetric {
                    firm: "Blank".to_string(),
                    metric: "cycle time",
                },
                RangeWarning::MissingMetric {
                    firm: "Blank".to_string(),
                    metric: "cost per case",
                },
            ]
        );
        assert_eq!(warnings[0].to_string(), "Blank: cycle time is missing, firm ranks last");
    }
}
