//! Score command - offline competitor ranking

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::Value;

use super::{bootstrap, money, print_json};
use crate::domain::analytics::{parse_money, Dto, SearchResults};
use crate::domain::competitor::{
    Candidate, CompetitorScorer, ReferenceProduct, ScoredCandidate, ScorerConfig,
};

/// Arguments for the score command
#[derive(Args, Clone)]
pub struct ScoreArgs {
    /// Keyword search response, raw or as a cached `{url, data}` payload
    #[arg(long)]
    pub candidates: PathBuf,

    /// Title of the reference product
    #[arg(long)]
    pub title: String,

    /// Price of the reference product, e.g. "19.99"
    #[arg(long)]
    pub price: Option<String>,

    /// ASIN of the reference product, excluded from the results
    #[arg(long)]
    pub asin: Option<String>,

    /// Maximum number of competitors (defaults to the configured limit)
    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long)]
    pub json: bool,
}

/// Run offline scoring
pub async fn run(args: ScoreArgs) -> anyhow::Result<()> {
    let config = bootstrap();

    let content = tokio::fs::read_to_string(&args.candidates)
        .await
        .with_context(|| format!("Failed to read {}", args.candidates.display()))?;
    let document: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", args.candidates.display()))?;

    let limit = args.limit.unwrap_or(config.flow.competitor_limit);
    let ranked = rank(&args, &document, limit);

    if args.json {
        return print_json(&ranked);
    }

    for (rank, scored) in ranked.iter().enumerate() {
        println!(
            "{:<4} {:<12} {:>6.3} {:>10}  {}",
            rank + 1,
            scored.candidate.asin,
            scored.composite_score,
            money(scored.candidate.search_price),
            scored.candidate.title
        );
    }
    Ok(())
}

fn rank(args: &ScoreArgs, document: &Value, limit: usize) -> Vec<ScoredCandidate> {
    let response = match document.get("data") {
        Some(data) if document.get("url").is_some() => data,
        _ => document,
    };
    let results = SearchResults::from_json(response);

    let price = args
        .price
        .as_ref()
        .and_then(|p| parse_money(&Value::String(p.clone())));
    let mut reference = ReferenceProduct::new(&args.title, price);
    if let Some(asin) = &args.asin {
        reference = reference.with_asin(asin.to_uppercase());
    }

    CompetitorScorer::new(ScorerConfig::default().with_limit(limit))
        .select(&reference, Candidate::from_search_results(&results.search_results))
}
