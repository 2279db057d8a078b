//! Sweep command - cache maintenance only

use super::{bootstrap, sweep_expired};

/// Remove expired cache entries and report how many went
pub async fn run() -> anyhow::Result<()> {
    let config = bootstrap();

    let cache = crate::create_cache(&config).await?;
    let removed = sweep_expired(&cache).await;

    println!("Removed {} expired cache entries", removed);
    Ok(())
}
