//! Competitor domain - title similarity, candidate scoring and selection

mod asin;
mod candidate;
mod scorer;
mod similarity;

pub use asin::{extract_asin_from_url, resolve_asin};
pub use candidate::{deepest_category_id, Candidate, PageProduct, ReferenceProduct};
pub use scorer::{price_score, CompetitorScorer, ScoredCandidate, ScorerConfig, NEUTRAL_PRICE_SCORE};
pub use similarity::{normalize_title, pick_search_term, title_similarity, title_tokens};
