use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monitored venues, in the fixed enumeration order used everywhere a
/// deterministic pair/tie-break order matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Uniswap,
    Aerodrome,
    Pancake,
}

impl Venue {
    /// Canonical enumeration order. Spread pairs and tie-breaks follow it.
    pub const ALL: [Venue; 3] = [Venue::Uniswap, Venue::Aerodrome, Venue::Pancake];

    /// Key used for this venue in the `[venues]` config table.
    pub fn config_key(&self) -> &'static str {
        match self {
            Venue::Uniswap => "uniswap",
            Venue::Aerodrome => "aerodrome",
            Venue::Pancake => "pancake",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Uniswap => write!(f, "Uniswap"),
            Venue::Aerodrome => write!(f, "Aerodrome"),
            Venue::Pancake => write!(f, "Pancake"),
        }
    }
}

/// One asset of the monitored pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub address: String,
    pub decimals: u32,
    pub symbol: String,
}

/// The monitored pair. Prices are always quote units per one base unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPair {
    pub base: AssetMetadata,
    pub quote: AssetMetadata,
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base.symbol, self.quote.symbol)
    }
}

/// Per-venue price state owned by the engine.
///
/// `last_price == 0` means "unknown" — no sample has produced a usable
/// price yet. `is_inverted` is fixed at registration: true when the quote
/// asset is the pool's token0, so the raw encoding reads base-per-quote.
#[derive(Debug, Clone)]
pub struct VenuePriceState {
    pub last_price: Decimal,
    pub is_inverted: bool,
}

/// A price-update event emitted by a venue feed.
///
/// The engine consumes only `venue` and `raw_sqrt_price`; the timestamp and
/// transaction reference are passed through for display.
#[derive(Debug, Clone)]
pub struct VenueUpdate {
    pub venue: Venue,
    pub raw_sqrt_price: BigUint,
    pub observed_at: DateTime<Utc>,
    pub tx_reference: Option<String>,
}

/// Per-leg cost detail of a simulated trade, all in quote units except
/// `trade_size_base`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeBreakdown {
    pub trade_notional_quote: Decimal,
    pub trade_size_base: Decimal,
    pub spent_after_fee: Decimal,
    pub received_after_fee: Decimal,
    pub buy_fee_quote: Decimal,
    pub sell_fee_quote: Decimal,
    pub total_gas_quote: Decimal,
}

/// Outcome of one two-leg arbitrage simulation (the better of both
/// directions). Derived on every qualifying update, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageResult {
    pub id: String,
    pub is_profitable: bool,
    pub net_profit_quote: Decimal,
    pub net_profit_pct: Decimal,
    pub buy_venue: Venue,
    pub sell_venue: Venue,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub breakdown: TradeBreakdown,
    pub simulated_at: DateTime<Utc>,
}

/// What one `on_venue_update` cycle produced.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub venue: Venue,
    pub price_changed: bool,
    pub new_price: Decimal,
    pub arbitrage: Option<ArbitrageResult>,
}
