use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::costs::{CostModel, CostTable};
use crate::types::{AssetMetadata, AssetPair, Venue};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    pub rpc: RpcConfig,
    pub assets: AssetPair,
    pub venues: HashMap<String, VenueConfig>,
}

/// Engine thresholds and the hypothetical budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Absolute quote-unit move required before a venue's stored price is
    /// replaced and a simulation runs.
    pub price_change_threshold: Decimal,
    pub initial_budget_quote: Decimal,
    pub budget_pct_per_trade: Decimal,
}

/// Chain endpoints shared by all venue feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub ws_url: String,
    pub http_url: String,
}

/// Per-venue configuration: the pool to watch and its cost shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    pub enabled: bool,
    pub pool_address: String,
    #[serde(flatten)]
    pub costs: CostModel,
}

impl Default for Config {
    fn default() -> Self {
        let mut venues = HashMap::new();
        venues.insert(
            "uniswap".to_string(),
            VenueConfig {
                enabled: true,
                pool_address: String::new(),
                costs: CostModel::Proportional {
                    fee_bps: Decimal::new(5, 0), // 5 bps pool tier
                    gas_fee_quote: Decimal::new(4, 3),
                },
            },
        );
        venues.insert(
            "aerodrome".to_string(),
            VenueConfig {
                enabled: true,
                pool_address: String::new(),
                costs: CostModel::Proportional {
                    fee_bps: Decimal::new(1, 0),
                    gas_fee_quote: Decimal::new(5, 3),
                },
            },
        );
        venues.insert(
            "pancake".to_string(),
            VenueConfig {
                enabled: true,
                pool_address: String::new(),
                costs: CostModel::Fixed {
                    fixed_fee_quote: Decimal::new(25, 2),
                    gas_fee_quote: Decimal::new(4, 3),
                },
            },
        );

        Config {
            engine: EngineConfig {
                price_change_threshold: Decimal::ONE, // $1
                initial_budget_quote: Decimal::new(10000, 0),
                budget_pct_per_trade: Decimal::new(5, 0),
            },
            rpc: RpcConfig {
                ws_url: "wss://base-rpc.publicnode.com".to_string(),
                http_url: "https://mainnet.base.org".to_string(),
            },
            assets: AssetPair {
                base: AssetMetadata {
                    address: "0xcbB7C0000aB88B473b1f5aFd9ef808440eed33Bf".to_string(),
                    decimals: 8,
                    symbol: "cbBTC".to_string(),
                },
                quote: AssetMetadata {
                    address: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".to_string(),
                    decimals: 6,
                    symbol: "USDC".to_string(),
                },
            },
            venues,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file: {}. Using defaults.", e);
                Self::default()
            }),
            Err(_) => {
                tracing::info!("No config file found at {}. Using defaults.", path);
                Self::default()
            }
        }
    }

    pub fn venue_config(&self, venue: Venue) -> Option<&VenueConfig> {
        self.venues.get(venue.config_key())
    }

    /// Venues that are both known to the engine and enabled in config, in
    /// canonical order.
    pub fn enabled_venues(&self) -> Vec<Venue> {
        Venue::ALL
            .into_iter()
            .filter(|v| self.venue_config(*v).map_or(false, |c| c.enabled))
            .collect()
    }

    /// Build the cost registry for every enabled venue.
    pub fn cost_table(&self) -> CostTable {
        CostTable::new(
            self.enabled_venues()
                .into_iter()
                .filter_map(|v| self.venue_config(v).map(|c| (v, c.costs.clone())))
                .collect(),
        )
    }
}
