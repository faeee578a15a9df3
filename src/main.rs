//! Pokedex - A caching PokeAPI client
//!
//! Prints the first page of location areas using the caching client.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokedex::{Config, PokeClient};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the client (cache store and reaper task)
/// 4. Fetch and print the first page of location areas
/// 5. Stop the reaper
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokedex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        "Configuration loaded: base_url={}, ttl={:?}, timeout={:?}",
        config.base_url, config.cache_ttl, config.request_timeout
    );

    let client = PokeClient::from_config(&config).context("failed to create client")?;

    let page = client
        .list_location_areas(None)
        .await
        .context("failed to list location areas")?;

    for area in &page.results {
        println!("{}", area.name);
    }
    if let Some(next) = &page.next {
        info!("Next page: {}", next);
    }

    let stats = client.cache_stats().await;
    info!(
        "Cache: {} entries, {} hits, {} misses",
        stats.total_entries, stats.hits, stats.misses
    );

    client.shutdown();
    Ok(())
}
