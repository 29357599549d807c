pub mod load;
pub mod types;

pub use load::{find_claim, load_claims, load_firms, load_similarity};
pub use types::{Claim, Firm, SimilarityRecord};
