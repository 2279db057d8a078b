//! Analyze command - product flow with competitor ranking

use anyhow::Context;
use clap::Args;
use serde_json::Value;

use super::{bootstrap, money, print_json, sweep_expired};
use crate::domain::competitor::{resolve_asin, PageProduct};
use crate::infrastructure::services::ProductDashboard;

/// Arguments for the analyze command
#[derive(Args, Clone)]
pub struct AnalyzeArgs {
    /// ASIN or Amazon product URL
    pub target: String,

    /// Title as shown on the product page
    #[arg(long)]
    pub title: Option<String>,

    /// Price as shown on the product page, e.g. "$19.99"
    #[arg(long)]
    pub price: Option<String>,

    /// Print the full dashboard as JSON
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeArgs {
    fn page_product(&self) -> anyhow::Result<PageProduct> {
        let asin = resolve_asin(&self.target)
            .with_context(|| format!("No ASIN found in '{}'", self.target))?;

        Ok(PageProduct {
            asin: Some(asin),
            title: self.title.clone(),
            price: self.price.clone().map(Value::String),
            ..Default::default()
        })
    }
}

/// Run the product flow
pub async fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = bootstrap();
    let page = args.page_product()?;

    let services = crate::create_services(&config).await?;
    sweep_expired(&services.cache).await;

    let dashboard = services.dashboard.run_product_flow(page).await?;

    if args.json {
        print_json(&dashboard)
    } else {
        print_dashboard(&dashboard);
        Ok(())
    }
}

fn print_dashboard(dashboard: &ProductDashboard) {
    println!("ASIN {}", dashboard.asin);
    println!("{}", dashboard.summary);
    println!();
    println!("Keywords: {}", dashboard.keyword_summary);
    println!("Search term: {}", dashboard.search_term);
    println!();
    println!(
        "{:<4} {:<12} {:>6} {:>6} {:>6} {:>10}  {}",
        "#", "ASIN", "score", "title", "price", "search $", "status"
    );

    for (rank, outcome) in dashboard.competitors.iter().enumerate() {
        let scored = &outcome.scored;
        let status = match (&outcome.error, &outcome.details) {
            (Some(error), _) => format!("error: {}", error),
            (None, Some(details)) if details.from_cache => "cached".to_string(),
            _ => "fetched".to_string(),
        };
        println!(
            "{:<4} {:<12} {:>6.3} {:>6.3} {:>6.3} {:>10}  {}",
            rank + 1,
            scored.candidate.asin,
            scored.composite_score,
            scored.title_similarity,
            scored.price_score,
            money(scored.candidate.search_price),
            status
        );
    }
}
