use rust_decimal::Decimal;
use tracing::debug;

/// Compounding hypothetical capital. Only profitable simulations feed it,
/// so the balance is monotonically non-decreasing for the process lifetime.
/// Not persisted across restarts.
#[derive(Debug, Clone)]
pub struct BudgetLedger {
    current_budget_quote: Decimal,
}

impl BudgetLedger {
    pub fn new(initial_budget_quote: Decimal) -> Self {
        Self {
            current_budget_quote: initial_budget_quote,
        }
    }

    /// Add a simulated profit. Zero or negative amounts are ignored.
    pub fn apply_profit(&mut self, amount: Decimal) {
        if amount <= Decimal::ZERO {
            return;
        }
        self.current_budget_quote += amount;
        debug!("Budget compounded by {} to {}", amount, self.current_budget_quote);
    }

    pub fn snapshot(&self) -> Decimal {
        self.current_budget_quote
    }
}
