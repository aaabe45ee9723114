use num_bigint::BigUint;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::codec;
use crate::costs::CostTable;
use crate::error::EngineError;
use crate::ledger::BudgetLedger;
use crate::simulator;
use crate::spread;
use crate::types::{AssetPair, UpdateOutcome, Venue, VenuePriceState};

/// The price-normalization and simulation engine.
///
/// Owns all mutable core state (per-venue prices and the budget ledger)
/// and is driven through `on_venue_update`, one event at a time. The
/// caller is expected to serialize calls — a single owning task is enough,
/// there is no parallelism to exploit inside a cycle.
pub struct Engine {
    pair: AssetPair,
    price_change_threshold: Decimal,
    budget_pct_per_trade: Decimal,
    states: HashMap<Venue, VenuePriceState>,
    costs: CostTable,
    ledger: BudgetLedger,
}

impl Engine {
    pub fn new(
        pair: AssetPair,
        price_change_threshold: Decimal,
        initial_budget_quote: Decimal,
        budget_pct_per_trade: Decimal,
        costs: CostTable,
    ) -> Self {
        Self {
            pair,
            price_change_threshold,
            budget_pct_per_trade,
            states: HashMap::new(),
            costs,
            ledger: BudgetLedger::new(initial_budget_quote),
        }
    }

    pub fn pair(&self) -> &AssetPair {
        &self.pair
    }

    pub fn current_budget(&self) -> Decimal {
        self.ledger.snapshot()
    }

    /// Register a venue from its pool's token ordering and initial
    /// sqrt-price read. Called once per venue before monitoring starts;
    /// every error here is a configuration defect and fatal.
    ///
    /// `is_inverted` is set here, exactly once: true when the pool quotes
    /// the pair with the quote asset as token0.
    pub fn register_venue(
        &mut self,
        venue: Venue,
        token0: &str,
        token1: &str,
        initial_raw: &BigUint,
    ) -> Result<Decimal, EngineError> {
        // Fail now rather than on the first simulation.
        self.costs.model(venue)?;

        let base = &self.pair.base.address;
        let quote = &self.pair.quote.address;
        let is_inverted = if token0.eq_ignore_ascii_case(base) && token1.eq_ignore_ascii_case(quote)
        {
            false
        } else if token0.eq_ignore_ascii_case(quote) && token1.eq_ignore_ascii_case(base) {
            true
        } else {
            return Err(EngineError::AssetMismatch { venue });
        };

        let last_price = match codec::derive_price(
            initial_raw,
            is_inverted,
            self.pair.base.decimals,
            self.pair.quote.decimals,
        ) {
            Ok(price) => price,
            // An unusable initial read just leaves the venue unknown until
            // its first event.
            Err(EngineError::UnavailablePrice) => Decimal::ZERO,
            Err(e) => return Err(e),
        };

        info!(
            "Registered {} for {} (inverted={}, initial price {})",
            venue, self.pair, is_inverted, last_price,
        );
        self.states.insert(
            venue,
            VenuePriceState {
                last_price,
                is_inverted,
            },
        );
        Ok(last_price)
    }

    /// Drive one full cycle: derive the venue's price, apply the change
    /// threshold, and on a real change pick the widest spread pair,
    /// simulate it against the current budget and compound any profit.
    ///
    /// Errors abort only this cycle; no state is touched on the error
    /// paths.
    pub fn on_venue_update(
        &mut self,
        venue: Venue,
        raw: &BigUint,
    ) -> Result<UpdateOutcome, EngineError> {
        let state = self
            .states
            .get(&venue)
            .ok_or(EngineError::UnknownVenue { venue })?;

        let price = codec::derive_price(
            raw,
            state.is_inverted,
            self.pair.base.decimals,
            self.pair.quote.decimals,
        )?;
        if price <= Decimal::ZERO {
            return Err(EngineError::UnavailablePrice);
        }

        if (price - state.last_price).abs() <= self.price_change_threshold {
            return Ok(UpdateOutcome {
                venue,
                price_changed: false,
                new_price: state.last_price,
                arbitrage: None,
            });
        }

        if let Some(state) = self.states.get_mut(&venue) {
            state.last_price = price;
        }

        let prices: HashMap<Venue, Decimal> = self
            .states
            .iter()
            .map(|(v, s)| (*v, s.last_price))
            .collect();

        let arbitrage = match spread::best_spread_pair(&prices) {
            Ok((a, b)) => {
                let result = simulator::simulate(
                    a,
                    prices[&a],
                    b,
                    prices[&b],
                    self.ledger.snapshot(),
                    self.budget_pct_per_trade,
                    &self.costs,
                )?;
                if result.is_profitable {
                    self.ledger.apply_profit(result.net_profit_quote);
                }
                Some(result)
            }
            // Expected while venues are still warming up.
            Err(EngineError::InsufficientVenues) => {
                debug!("{} updated but fewer than two venues are priced", venue);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(UpdateOutcome {
            venue,
            price_changed: true,
            new_price: price,
            arbitrage,
        })
    }
}
