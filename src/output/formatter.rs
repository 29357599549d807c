use std::io::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{Width, terminal_size};

use crate::llm::{ExhibitOutcome, ExhibitReport, LlmError};
use crate::roster::types::Claim;
use crate::scoring::{ClusterSummary, Recommendation};
use crate::similar::SimilarMatch;

pub const NO_RECOMMENDATIONS: &str = "No recommended firms found for the selected criteria.";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with two decimals ("4.65")
pub fn format_score(score: f64) -> String {
    if score.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}", score)
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format recommendations as a table with columns:
/// Index, Score, Firm, Jurisdictions, Win rate, Cost, Cycle time
///
/// No headers. Firm names shrink to fit the terminal; pipes get them whole.
pub fn format_recommendation_table(recs: &[Recommendation], use_colors: bool) -> String {
    format_table_with_width(recs, use_colors, get_terminal_width())
}

fn format_table_with_width(
    recs: &[Recommendation],
    use_colors: bool,
    term_width: Option<usize>,
) -> String {
    if recs.is_empty() {
        return NO_RECOMMENDATIONS.to_string();
    }

    let index_width = 3;
    let score_width = 6;
    let metric_width = 8;
    let separator = "  ";

    let states_width = recs
        .iter()
        .map(|r| r.firm.jurisdictions.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);

    // index + space + score + firm + states + three metric columns
    let fixed_width = index_width
        + 1
        + score_width
        + states_width
        + metric_width * 3
        + separator.len() * 5;

    let name_limit = match term_width {
        Some(width) if width > fixed_width + 10 => Some(width - fixed_width),
        // Very narrow terminal, show truncated
        Some(_) => Some(20),
        None => None,
    };
    let names: Vec<String> = recs
        .iter()
        .map(|r| match name_limit {
            Some(limit) => truncate_name(&r.firm.name, limit),
            None => r.firm.name.clone(),
        })
        .collect();
    let name_width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);

    recs.iter()
        .zip(names)
        .enumerate()
        .map(|(idx, (rec, name))| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_padded = format!("{:>width$}", format_score(rec.score), width = score_width);
            let name_padded = format!("{:<width$}", name, width = name_width);

            let states = format!(
                "{:<width$}",
                truncate_name(&rec.firm.jurisdictions, states_width),
                width = states_width
            );
            let win = format!("{:>width$}", rec.display.win_rate, width = metric_width);
            let cost = format!("{:>width$}", rec.display.cost, width = metric_width);
            let cycle = format!("{:>width$}", rec.display.cycle_time, width = metric_width);

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    score_padded.bold(),
                    separator,
                    name_padded.bold(),
                    separator,
                    states.cyan(),
                    separator,
                    win.green(),
                    separator,
                    cost.yellow(),
                    separator,
                    cycle.magenta()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}{}{}",
                    index_str,
                    score_padded,
                    separator,
                    name_padded,
                    separator,
                    states,
                    separator,
                    win,
                    separator,
                    cost,
                    separator,
                    cycle
                )
            }
        })
        .map(|line| line.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one recommendation with its score breakdown (for verbose mode)
pub fn format_recommendation_detail(rec: &Recommendation, use_colors: bool) -> String {
    let b = &rec.breakdown;
    let breakdown = format!(
        "cycle {:.2} + win {:.2} + cost {:.2}",
        b.cycle_time, b.win_rate, b.cost
    );

    if use_colors {
        format!(
            "{}\n  Score: {} ({})\n  Cluster: {}\n  Jurisdictions: {}\n  Win rate: {}\n  Cost per case: {}\n  Cycle time: {}",
            rec.firm.name.bold(),
            format_score(rec.score).bold(),
            breakdown.dimmed(),
            rec.firm.cluster,
            rec.firm.jurisdictions.cyan(),
            rec.display.win_rate.green(),
            rec.display.cost.yellow(),
            rec.display.cycle_time.magenta()
        )
    } else {
        format!(
            "{}\n  Score: {} ({})\n  Cluster: {}\n  Jurisdictions: {}\n  Win rate: {}\n  Cost per case: {}\n  Cycle time: {}",
            rec.firm.name,
            format_score(rec.score),
            breakdown,
            rec.firm.cluster,
            rec.firm.jurisdictions,
            rec.display.win_rate,
            rec.display.cost,
            rec.display.cycle_time
        )
    }
}

/// Format recommendations as tab-separated values for scripting
/// Columns: score, firm, jurisdictions, win rate, cost, cycle time (no headers, no colors)
pub fn format_tsv(recs: &[Recommendation]) -> String {
    if recs.is_empty() {
        return String::new();
    }

    recs.iter()
        .map(|rec| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                format_score(rec.score),
                rec.firm.name,
                rec.firm.jurisdictions,
                rec.display.win_rate,
                rec.display.cost,
                rec.display.cycle_time
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty JSON for any serializable result
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn or_missing<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> String {
    value.map(render).unwrap_or_else(|| "n/a".to_string())
}

/// Cluster averages card; a cluster with no firms reads as "no data"
pub fn format_cluster_card(
    cluster: &str,
    summary: Option<&ClusterSummary>,
    use_colors: bool,
) -> String {
    let title = if use_colors {
        format!("Cluster: {}", cluster.bold())
    } else {
        format!("Cluster: {}", cluster)
    };

    match summary {
        None => format!("{}\n  No firm data for this cluster.", title),
        Some(s) => format!(
            "{}\n  Firms: {}\n  Avg cycle time: {}\n  Avg win rate: {}\n  Avg cost per case: {}",
            title,
            s.firm_count,
            or_missing(s.avg_cycle_time_days, |v| format!("{} Days", v)),
            or_missing(s.avg_win_rate_pct, |v| format!("{:.1}%", v)),
            or_missing(s.avg_cost_thousands, |v| format!("${}K", v)),
        ),
    }
}

/// Context line for the claim a recommendation was made for
pub fn format_claim_header(claim: &Claim, use_colors: bool) -> String {
    let injury = if claim.injury.is_empty() {
        "-"
    } else {
        claim.injury.as_str()
    };

    if use_colors {
        format!(
            "Claim #{}  {}  {}  Demand: {}  Offer: {}  Cluster: {}",
            claim.index.bold(),
            claim.jurisdiction.cyan(),
            injury,
            claim.demand,
            claim.offer,
            claim.cluster.bold()
        )
    } else {
        format!(
            "Claim #{}  {}  {}  Demand: {}  Offer: {}  Cluster: {}",
            claim.index, claim.jurisdiction, injury, claim.demand, claim.offer, claim.cluster
        )
    }
}

/// Similar claims, best match first
pub fn format_similar_claims(claim_id: &str, matches: &[SimilarMatch], use_colors: bool) -> String {
    if matches.is_empty() {
        return format!("No similar claims found for claim {}.", claim_id);
    }

    let lines = matches.iter().map(|m| {
        let r = &m.record;
        let score = format!("{:.3}", m.similarity);
        let id = format!("{:>8}", r.claim_id);
        if use_colors {
            format!(
                "{}  {}  {}  {}  {}  {}",
                id.dimmed(),
                score.bold(),
                r.claim_type,
                r.jurisdiction.cyan(),
                r.injury,
                r.law_firm.yellow()
            )
        } else {
            format!(
                "{}  {}  {}  {}  {}  {}",
                id, score, r.claim_type, r.jurisdiction, r.injury, r.law_firm
            )
        }
    });

    std::iter::once(format!("Claims similar to {}:", claim_id))
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| format!("    {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One exhibit's outcome; failures show the error in place of the report
pub fn format_exhibit_report(
    path: &std::path::Path,
    result: &Result<ExhibitReport, LlmError>,
    use_colors: bool,
) -> String {
    let header = if use_colors {
        format!("{}", path.display().bold())
    } else {
        path.display().to_string()
    };

    let body = match result {
        Err(e) => {
            let msg = format!("LLM error: {}", e);
            if use_colors {
                format!("  {}", msg.red())
            } else {
                format!("  {}", msg)
            }
        }
        Ok(report) => match &report.outcome {
            ExhibitOutcome::Unsupported { extension } => {
                let ext = if extension.is_empty() {
                    "(none)"
                } else {
                    extension.as_str()
                };
                format!("  Unsupported file type for processing: {}", ext)
            }
            ExhibitOutcome::Analyzed {
                summary,
                follow_ups,
                recommendations,
            } => format!(
                "  Summary:\n{}\n  Follow-up questions:\n{}\n  Recommended next steps:\n{}\n  Generated: {}",
                indent(summary),
                indent(follow_ups),
                indent(recommendations),
                report.generated_at.format("%Y-%m-%d %H:%M UTC")
            ),
        },
    };

    format!("{}\n{}", header, body)
}
