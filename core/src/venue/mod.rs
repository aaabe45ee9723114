use async_trait::async_trait;
use num_bigint::BigUint;
use tokio::sync::mpsc;

use crate::types::{Venue, VenueUpdate};

pub mod evm;

/// Result of the one-time pool state read performed at startup: the pool's
/// token ordering (which fixes `is_inverted`) and the current sqrt price.
#[derive(Debug, Clone)]
pub struct PoolInit {
    pub token0: String,
    pub token1: String,
    pub sqrt_price: BigUint,
}

/// Boundary trait every venue feed implements. The engine never talks to
/// the network; it consumes `VenueUpdate`s the feed pushes over the
/// returned channel.
#[async_trait]
pub trait VenueFeed: Send + Sync {
    /// Which venue this feed watches
    fn venue(&self) -> Venue;

    /// One-shot initialization read of the pool's tokens and price.
    async fn init(&self) -> Result<PoolInit, FeedError>;

    /// Subscribe to the pool's swap stream. The feed keeps the stream
    /// alive (reconnecting as needed) until the receiver is dropped.
    async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<VenueUpdate>, FeedError>;
}

/// Feed-side errors. These never reach the engine; a bad frame is logged
/// and skipped, a failed connection is retried.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),
}
