//! Similar-claims explorer.
//!
//! The similarity model writes each claim's top matches as two list-literal
//! columns. This module parses them and resolves the ids back into claim rows.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::roster::types::SimilarityRecord;

/// A dataset claim matched to the selected claim
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimilarMatch {
    pub record: SimilarityRecord,
    pub similarity: f64,
}

fn list_items(text: &str) -> Result<Vec<&str>> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .with_context(|| format!("Expected a bracketed list, got '{}'", trimmed))?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(inner.split(',').map(str::trim).collect())
}

/// Parse a list of ids such as `['12', "40", 7]`
pub fn parse_id_list(text: &str) -> Result<Vec<String>> {
    list_items(text)?
        .into_iter()
        .map(|item| {
            let unquoted = item
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .or_else(|| item.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
                .unwrap_or(item)
                .trim();
            if unquoted.is_empty() {
                bail!("Empty claim id in list '{}'", text.trim());
            }
            Ok(unquoted.to_string())
        })
        .collect()
}

/// Parse a list of scores such as `[0.91, 0.87]`
pub fn parse_score_list(text: &str) -> Result<Vec<f64>> {
    list_items(text)?
        .into_iter()
        .map(|item| {
            let score: f64 = item
                .parse()
                .with_context(|| format!("Invalid similarity score '{}'", item))?;
            if !score.is_finite() {
                bail!("Similarity score '{}' is not a finite number", item);
            }
            Ok(score)
        })
        .collect()
}

/// Resolve the pre-computed matches for `claim_id`, best match first.
///
/// Ids are paired with scores by position; ids with no row in the dataset are
/// skipped. A repeated id keeps the last score listed for it.
pub fn similar_claims(records: &[SimilarityRecord], claim_id: &str) -> Result<Vec<SimilarMatch>> {
    let claim_id = claim_id.trim();
    let selected = records
        .iter()
        .find(|r| r.claim_id == claim_id)
        .with_context(|| format!("Claim {} not found in similarity dataset", claim_id))?;

    let ids = parse_id_list(&selected.similar_ids)
        .with_context(|| format!("Bad similar claim ids for claim {}", claim_id))?;
    let scores = parse_score_list(&selected.similar_scores)
        .with_context(|| format!("Bad similarity scores for claim {}", claim_id))?;

    if ids.len() != scores.len() {
        tracing::warn!(
            claim = claim_id,
            ids = ids.len(),
            scores = scores.len(),
            "similar id and score lists differ in length"
        );
    }

    let score_map: HashMap<String, f64> = ids.into_iter().zip(scores).collect();

    let mut matches: Vec<SimilarMatch> = records
        .iter()
        .filter_map(|r| {
            score_map.get(&r.claim_id).map(|&similarity| SimilarMatch {
                record: r.clone(),
                similarity,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });

    Ok(matches)
}
