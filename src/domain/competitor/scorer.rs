use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::candidate::{Candidate, ReferenceProduct};
use super::similarity::title_similarity;

/// Score used when either side of the price comparison is unknown
pub const NEUTRAL_PRICE_SCORE: f64 = 0.5;

/// Weights and limits for competitor selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub title_weight: f64,
    pub price_weight: f64,
    pub sponsored_adjustment: f64,
    pub organic_adjustment: f64,
    pub limit: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            title_weight: 0.75,
            price_weight: 0.25,
            sponsored_adjustment: -0.05,
            organic_adjustment: 0.02,
            limit: 10,
        }
    }
}

impl ScorerConfig {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_weights(mut self, title_weight: f64, price_weight: f64) -> Self {
        self.title_weight = title_weight;
        self.price_weight = price_weight;
        self
    }

    pub fn with_adjustments(mut self, sponsored: f64, organic: f64) -> Self {
        self.sponsored_adjustment = sponsored;
        self.organic_adjustment = organic;
        self
    }
}

/// A candidate together with its component and composite scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub title_similarity: f64,
    pub price_score: f64,
    pub composite_score: f64,
}

/// Ranks search-result candidates against a reference product
#[derive(Debug, Clone, Default)]
pub struct CompetitorScorer {
    config: ScorerConfig,
}

impl CompetitorScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Scores a single candidate
    pub fn score(&self, reference: &ReferenceProduct, candidate: Candidate) -> ScoredCandidate {
        let title_similarity = title_similarity(&reference.title, &candidate.title);
        let price_score = price_score(reference.price, candidate.search_price);
        let adjustment = if candidate.is_sponsored {
            self.config.sponsored_adjustment
        } else {
            self.config.organic_adjustment
        };

        let composite_score = clamp01(
            self.config.title_weight * title_similarity
                + self.config.price_weight * price_score
                + adjustment,
        );

        ScoredCandidate {
            candidate,
            title_similarity,
            price_score,
            composite_score,
        }
    }

    /// Scores every candidate and returns at most `limit` of them, best first.
    ///
    /// The reference product's own ASIN is never returned. Equal scores are
    /// ordered by ASIN ascending.
    pub fn select(
        &self,
        reference: &ReferenceProduct,
        candidates: Vec<Candidate>,
    ) -> Vec<ScoredCandidate> {
        let own_asin = reference.asin.as_deref();

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|c| !own_asin.is_some_and(|own| own.eq_ignore_ascii_case(&c.asin)))
            .map(|c| self.score(reference, c))
            .collect();

        scored.sort_by(|a, b| {
            b.composite_score
                .partial_cmp(&a.composite_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.candidate.asin.cmp(&b.candidate.asin))
        });
        scored.truncate(self.config.limit);
        scored
    }
}

/// Relative price proximity in [0, 1]
pub fn price_score(reference: Option<f64>, candidate: Option<f64>) -> f64 {
    match (reference, candidate) {
        (Some(original), Some(price)) if original.is_finite() && price.is_finite() => {
            clamp01(1.0 - (price - original).abs() / original.max(1.0))
        }
        _ => NEUTRAL_PRICE_SCORE,
    }
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
