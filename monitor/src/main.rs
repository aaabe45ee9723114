mod render;

use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dexpulse_core::venue::evm::EvmPoolFeed;
use dexpulse_core::venue::VenueFeed;
use dexpulse_core::{Config, Engine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load("config.toml");
    info!(
        "Monitoring {} | threshold ${} | budget ${} at {}% per trade",
        config.assets,
        config.engine.price_change_threshold,
        config.engine.initial_budget_quote,
        config.engine.budget_pct_per_trade,
    );

    // A venue without a cost model is a configuration defect; refuse to
    // enter the monitoring phase at all.
    let cost_table = config.cost_table();
    cost_table.ensure_registered(&config.enabled_venues())?;

    let mut engine = Engine::new(
        config.assets.clone(),
        config.engine.price_change_threshold,
        config.engine.initial_budget_quote,
        config.engine.budget_pct_per_trade,
        cost_table,
    );

    let mut feeds: Vec<Arc<EvmPoolFeed>> = Vec::new();
    for venue in config.enabled_venues() {
        let venue_cfg = config
            .venue_config(venue)
            .expect("enabled venue has config");
        info!("{} enabled | pool={}", venue, venue_cfg.pool_address);
        feeds.push(Arc::new(EvmPoolFeed::new(
            venue,
            venue_cfg.pool_address.clone(),
            config.rpc.clone(),
        )));
    }

    // Register every venue before monitoring starts. A failure here is a
    // configuration defect, so it ends the process instead of being
    // retried per event.
    for feed in &feeds {
        let init = feed.init().await?;
        let seed_price = engine.register_venue(
            feed.venue(),
            &init.token0,
            &init.token1,
            &init.sqrt_price,
        )?;
        info!("{} seeded at {}", feed.venue(), seed_price);
    }

    // Merge every feed into one channel; the single consumer below owns
    // the engine, which serializes update cycles.
    let (update_tx, mut update_rx) = tokio::sync::mpsc::unbounded_channel();
    for feed in &feeds {
        let mut feed_rx = feed.subscribe().await?;
        let tx = update_tx.clone();
        tokio::spawn(async move {
            while let Some(update) = feed_rx.recv().await {
                if tx.send(update).is_err() {
                    break;
                }
            }
        });
    }
    drop(update_tx);

    info!("Watching {} venue(s) for {} swaps", feeds.len(), config.assets);

    while let Some(update) = update_rx.recv().await {
        match engine.on_venue_update(update.venue, &update.raw_sqrt_price) {
            Ok(outcome) => render::outcome(&engine, &update, &outcome),
            Err(e) => warn!("Dropped update from {}: {}", update.venue, e),
        }
    }

    Ok(())
}
