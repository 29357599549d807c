pub mod formatter;

pub use formatter::{
    format_claim_header, format_cluster_card, format_exhibit_report, format_json,
    format_recommendation_detail, format_recommendation_table, format_score, format_similar_claims,
    format_tsv, should_use_colors, NO_RECOMMENDATIONS,
};
