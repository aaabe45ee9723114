use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::EngineError;
use crate::types::Venue;

/// Per-venue trading cost shape. A venue has exactly one shape for its
/// lifetime; simulations branch on the variant rather than assuming both
/// fee fields exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostModel {
    /// Proportional fee in basis points of the leg notional, plus a fixed
    /// gas cost per leg (quote units).
    Proportional {
        fee_bps: Decimal,
        gas_fee_quote: Decimal,
    },
    /// Flat fee per leg regardless of notional, plus gas (quote units).
    Fixed {
        fixed_fee_quote: Decimal,
        gas_fee_quote: Decimal,
    },
}

impl CostModel {
    pub fn gas_fee_quote(&self) -> Decimal {
        match self {
            CostModel::Proportional { gas_fee_quote, .. } => *gas_fee_quote,
            CostModel::Fixed { gas_fee_quote, .. } => *gas_fee_quote,
        }
    }
}

/// Registry mapping each venue to its cost model.
#[derive(Debug, Clone, Default)]
pub struct CostTable {
    models: HashMap<Venue, CostModel>,
}

impl CostTable {
    pub fn new(models: HashMap<Venue, CostModel>) -> Self {
        Self { models }
    }

    /// Look up the cost model for a venue. A miss means the configuration
    /// never registered the venue.
    pub fn model(&self, venue: Venue) -> Result<&CostModel, EngineError> {
        self.models
            .get(&venue)
            .ok_or(EngineError::UnknownVenue { venue })
    }

    /// Init-time check that every venue in `venues` has a model. Failing
    /// this is a configuration defect and fatal before monitoring starts.
    pub fn ensure_registered<'a, I>(&self, venues: I) -> Result<(), EngineError>
    where
        I: IntoIterator<Item = &'a Venue>,
    {
        for &venue in venues {
            self.model(venue)?;
        }
        Ok(())
    }
}
