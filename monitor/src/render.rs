use tracing::{debug, info};

use dexpulse_core::{Engine, UpdateOutcome, VenueUpdate};

/// Console rendering for one update cycle. Display only — the engine has
/// already committed whatever this cycle changed.
pub fn outcome(engine: &Engine, update: &VenueUpdate, outcome: &UpdateOutcome) {
    if !outcome.price_changed {
        debug!("{} unchanged at {}", outcome.venue, outcome.new_price);
        return;
    }

    let tx = update.tx_reference.as_deref().unwrap_or("-");
    info!(
        "{} {} @ {} | tx {}",
        outcome.venue,
        engine.pair(),
        outcome.new_price.round_dp(2),
        tx,
    );

    let Some(result) = &outcome.arbitrage else {
        return;
    };

    if result.is_profitable {
        info!(
            "💰 [{}] Buy {} @ {} → Sell {} @ {} | net +{} ({}%) | budget now ${}",
            result.id,
            result.buy_venue,
            result.buy_price.round_dp(2),
            result.sell_venue,
            result.sell_price.round_dp(2),
            result.net_profit_quote.round_dp(6),
            result.net_profit_pct.round_dp(4),
            engine.current_budget().round_dp(2),
        );
        info!(
            "    notional ${} | size {} | spent {} | received {} | fees {}/{} | gas {}",
            result.breakdown.trade_notional_quote.round_dp(2),
            result.breakdown.trade_size_base.round_dp(8),
            result.breakdown.spent_after_fee.round_dp(6),
            result.breakdown.received_after_fee.round_dp(6),
            result.breakdown.buy_fee_quote.round_dp(6),
            result.breakdown.sell_fee_quote.round_dp(6),
            result.breakdown.total_gas_quote,
        );
    } else {
        debug!(
            "Best pair {}→{} not profitable: net {} ({}%)",
            result.buy_venue,
            result.sell_venue,
            result.net_profit_quote.round_dp(6),
            result.net_profit_pct.round_dp(4),
        );
    }
}
