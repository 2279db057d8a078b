//! Verify-token command - credential check against the analytics API

use super::bootstrap;

/// Probe the API with the configured credentials
pub async fn run() -> anyhow::Result<()> {
    let config = bootstrap();
    if !config.api.has_credentials() {
        anyhow::bail!("Set api.client_id and api.token (APP__API__CLIENT_ID, APP__API__TOKEN)");
    }

    let services = crate::create_services(&config).await?;
    let status = services.fetcher.verify_credentials().await?;

    println!("{}", status.message());
    if !status.is_valid() {
        anyhow::bail!("Credential check failed");
    }
    Ok(())
}
