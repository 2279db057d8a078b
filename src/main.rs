use clap::Parser;
use asin_insights::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => cli::analyze::run(args).await,
        Command::Category(args) => cli::category::run(args).await,
        Command::Score(args) => cli::score::run(args).await,
        Command::Sweep => cli::sweep::run().await,
        Command::VerifyToken => cli::verify::run().await,
    }
}
