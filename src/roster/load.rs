use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

use super::types::{Claim, Firm, SimilarityRecord};

/// Read every row of a headered CSV file into `T`, preserving file order.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        anyhow::bail!("Dataset not found at {}", path.display());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open dataset at {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<T>().enumerate() {
        // Row 1 is the header line
        let row = record.with_context(|| {
            format!("Failed to parse row {} of {}", i + 2, path.display())
        })?;
        rows.push(row);
    }

    tracing::debug!(rows = rows.len(), path = %path.display(), "loaded dataset");
    Ok(rows)
}

/// Load the firm roster (`Firm Name`, `Cluster_name`, `state_list`, ...)
pub fn load_firms(path: &Path) -> Result<Vec<Firm>> {
    read_rows(path)
}

/// Load claims with predicted clusters; each claim gets its row position as index
pub fn load_claims(path: &Path) -> Result<Vec<Claim>> {
    let mut claims: Vec<Claim> = read_rows(path)?;
    for (i, claim) in claims.iter_mut().enumerate() {
        claim.index = i;
    }
    Ok(claims)
}

/// Load the similarity model output (`claim_id`, `top_5_similar_claim_ids`, ...)
pub fn load_similarity(path: &Path) -> Result<Vec<SimilarityRecord>> {
    read_rows(path)
}

/// Look up a claim by row position
pub fn find_claim(claims: &[Claim], index: usize) -> Option<&Claim> {
    claims.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_firms_dataset_columns() {
        let file = write_csv(
            "Firm Name,Cluster_name,state_list,Cycle time,Win rate proxy,Cost per case,PC1\n\
             \"Phillips & Garcia, LLP\",Outcome Specialists,\"TX, OK\",5,0.6,4,1.2\n\
             Lee Legal,Efficient Volume Handlers,TX,3.5,0.5,2,-0.3\n",
        );

        let firms = load_firms(file.path()).unwrap();
        assert_eq!(firms.len(), 2);
        assert_eq!(firms[0].name, "Phillips & Garcia, LLP");
        assert_eq!(firms[0].jurisdictions, "TX, OK");
        assert_eq!(firms[1].cycle_time, 3.5);
        assert_eq!(firms[1].cluster, "Efficient Volume Handlers");
    }

    #[test]
    fn test_load_firms_bad_number_reports_row() {
        let file = write_csv(
            "Firm Name,Cluster_name,state_list,Cycle time,Win rate proxy,Cost per case\n\
             A,X,TX,5,0.6,4\n\
             B,X,TX,fast,0.5,2\n",
        );

        let err = load_firms(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("row 3"));
    }

    #[test]
    fn test_load_firms_blank_metric_is_nan() {
        let file = write_csv(
            "Firm Name,Cluster_name,state_list,Cycle time,Win rate proxy,Cost per case\n\
             A,X,TX,5,0.6,4\n\
             B,X,TX,,0.5,2\n\
             C,X,TX,3, ,\n",
        );

        let firms = load_firms(file.path()).unwrap();
        assert_eq!(firms.len(), 3);
        assert!(firms[1].cycle_time.is_nan());
        assert_eq!(firms[1].win_rate, 0.5);
        assert!(firms[2].win_rate.is_nan());
        assert!(firms[2].cost_per_case.is_nan());
        assert_eq!(firms[2].cycle_time, 3.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_firms(Path::new("/nonexistent/firms.csv")).unwrap_err();
        assert!(err.to_string().contains("Dataset not found"));
    }

    #[test]
    fn test_load_claims_assigns_row_index() {
        let file = write_csv(
            "FTR_JRSDTN_ST_ABBR,BODY_PART_INJD_DESC,DEMAND,OFFER,Cluster_name,Firm Name\n\
             TX,Neck,250000,40000,Outcome Specialists,Lee Legal\n\
             ME,Back,90000,10000,High-Value Core Firms,Stone LLP\n",
        );

        let claims = load_claims(file.path()).unwrap();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].index, 0);
        assert_eq!(claims[1].index, 1);
        assert_eq!(find_claim(&claims, 1).unwrap().jurisdiction, "ME");
        assert!(find_claim(&claims, 2).is_none());
    }

    #[test]
    fn test_load_similarity_keeps_list_literals() {
        let file = write_csv(
            "claim_id,Claim,FTR_JRSDTN_ST_ABBR,BODY_PART_INJD_DESC,Law Firm Name,Claim_Notes,match_scope,top_5_similar_claim_ids,top_5_similarity_scores\n\
             1,Auto,TX,Neck,Lee Legal,Rear-ended at light,state,\"['2', '3']\",\"[0.9, 0.8]\"\n",
        );

        let records = load_similarity(file.path()).unwrap();
        assert_eq!(records[0].claim_id, "1");
        assert_eq!(records[0].similar_ids, "['2', '3']");
        assert_eq!(records[0].similar_scores, "[0.9, 0.8]");
    }
}
