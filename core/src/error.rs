use crate::types::Venue;

/// Errors produced by the core engine.
///
/// All variants except `UnknownVenue` and `AssetMismatch` are per-event:
/// they abort the current update cycle and leave all state untouched.
/// `UnknownVenue` and `AssetMismatch` are configuration defects and are
/// treated as fatal when hit during initialization.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid raw price sample: {0}")]
    InvalidSample(String),

    #[error("derived price is unusable")]
    UnavailablePrice,

    #[error("fewer than two venues have a known price")]
    InsufficientVenues,

    #[error("no cost model registered for venue {venue}")]
    UnknownVenue { venue: Venue },

    #[error("pool tokens for {venue} do not match the configured pair")]
    AssetMismatch { venue: Venue },
}
