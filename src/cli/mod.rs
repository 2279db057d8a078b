//! CLI module for ASIN Insights
//!
//! Provides subcommands for the dashboard flows and cache maintenance:
//! - `analyze`: product details, keywords and ranked competitors
//! - `category`: product details plus its category best sellers
//! - `score`: offline competitor scoring of a saved search response
//! - `sweep`: removes expired cache entries
//! - `verify-token`: checks the configured API credentials

pub mod analyze;
pub mod category;
pub mod score;
pub mod sweep;
pub mod verify;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::cache::CacheStore;
use crate::infrastructure::logging;

/// ASIN Insights - seller analytics and competitor selection for Amazon products
#[derive(Parser)]
#[command(name = "asin-insights")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze a product and rank its competitors
    Analyze(analyze::AnalyzeArgs),

    /// Show a product with the best sellers of its category
    Category(category::CategoryArgs),

    /// Rank candidates from a saved keyword search response
    Score(score::ScoreArgs),

    /// Remove expired cache entries
    Sweep,

    /// Check whether the configured API credentials are accepted
    VerifyToken,
}

/// Loads `.env` and configuration, then installs logging
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);
    config
}

/// Sweeps expired entries; a failing sweep does not stop the command
pub(crate) async fn sweep_expired(cache: &Arc<dyn CacheStore>) -> usize {
    match cache.sweep_expired().await {
        Ok(removed) => {
            info!(removed, "Expired cache entries swept");
            removed
        }
        Err(e) => {
            warn!(error = %e, "Cache sweep failed");
            0
        }
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("${:.2}", v))
}
