//! Category command - product with its category best sellers

use anyhow::Context;
use clap::Args;

use super::{bootstrap, money, print_json, sweep_expired};
use crate::domain::analytics::parse_money;
use crate::domain::competitor::resolve_asin;
use crate::infrastructure::services::CategoryDashboard;

/// Arguments for the category command
#[derive(Args, Clone)]
pub struct CategoryArgs {
    /// ASIN or Amazon product URL
    pub target: String,

    /// Print the full dashboard as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the category flow
pub async fn run(args: CategoryArgs) -> anyhow::Result<()> {
    let config = bootstrap();
    let asin = resolve_asin(&args.target)
        .with_context(|| format!("No ASIN found in '{}'", args.target))?;

    let services = crate::create_services(&config).await?;
    sweep_expired(&services.cache).await;

    let dashboard = services.dashboard.run_category_flow(&asin).await?;

    if args.json {
        print_json(&dashboard)
    } else {
        print_dashboard(&dashboard);
        Ok(())
    }
}

fn print_dashboard(dashboard: &CategoryDashboard) {
    println!("ASIN {}", dashboard.asin);
    println!("{}", dashboard.summary);
    println!();

    let Some(products) = &dashboard.category_products else {
        println!("No category found for this product");
        return;
    };

    println!(
        "Category {} ({} products indexed)",
        dashboard.category_id.as_deref().unwrap_or("-"),
        products
            .data
            .total_indexed_products
            .map_or_else(|| "?".to_string(), |n| n.to_string())
    );
    for (rank, item) in products.data.search_results.iter().enumerate() {
        let price = item
            .price
            .as_ref()
            .and_then(parse_money)
            .or_else(|| item.listing_price.as_ref().and_then(parse_money));
        println!(
            "{:<4} {:<12} {:>10}  {}",
            rank + 1,
            item.asin.as_deref().unwrap_or("-"),
            money(price),
            item.title.as_deref().unwrap_or("")
        );
    }
}
