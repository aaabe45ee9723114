pub mod codec;
pub mod config;
pub mod costs;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod simulator;
pub mod spread;
pub mod types;
pub mod venue;

pub use config::Config;
pub use engine::Engine;
pub use error::EngineError;
pub use ledger::BudgetLedger;
pub use types::*;
