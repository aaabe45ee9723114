use async_trait::async_trait;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::codec;
use crate::config::RpcConfig;
use crate::types::{Venue, VenueUpdate};
use crate::venue::{FeedError, PoolInit, VenueFeed};

const TOKEN0_SELECTOR: &str = "0x0dfe1681";
const TOKEN1_SELECTOR: &str = "0xd21220a7";
const SLOT0_SELECTOR: &str = "0x3850c7bd";

/// Swap topic shared by Uniswap V3 and Aerodrome Slipstream pools.
const SWAP_TOPIC_V3: &str =
    "0xc42079f94a6350d7e6235f29174924f928cc2ac818eb64fed8004e115fbcca67";
/// Pancake V3 appends protocol-fee fields to the event, so its hash differs.
const SWAP_TOPIC_PANCAKE: &str =
    "0x19b47279256b2a23a1665c810c8d55a1758940ee09377d4f8d26497a3577dc83";

/// Index of the sqrtPriceX96 word in the Swap event data. Both layouts
/// place it third, after amount0 and amount1.
const SQRT_PRICE_WORD: usize = 2;

fn swap_topic(venue: Venue) -> &'static str {
    match venue {
        Venue::Uniswap | Venue::Aerodrome => SWAP_TOPIC_V3,
        Venue::Pancake => SWAP_TOPIC_PANCAKE,
    }
}

/// One concentrated-liquidity pool watched over JSON-RPC: `eth_call` reads
/// at init, an `eth_subscribe` log stream afterwards. The price is taken
/// from the Swap event payload itself; no per-event state re-read.
pub struct EvmPoolFeed {
    venue: Venue,
    pool_address: String,
    rpc: RpcConfig,
    client: reqwest::Client,
}

impl EvmPoolFeed {
    pub fn new(venue: Venue, pool_address: String, rpc: RpcConfig) -> Self {
        Self {
            venue,
            pool_address,
            rpc,
            client: reqwest::Client::new(),
        }
    }

    async fn eth_call(&self, calldata: &str) -> Result<String, FeedError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{"to": self.pool_address, "data": calldata}, "latest"],
        });

        let resp = self
            .client
            .post(&self.rpc.http_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FeedError::Connection(e.to_string()))?;

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))?;

        if let Some(err) = data.get("error") {
            return Err(FeedError::Rpc(err.to_string()));
        }
        data["result"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FeedError::Parse("eth_call response has no result".to_string()))
    }
}

#[async_trait]
impl VenueFeed for EvmPoolFeed {
    fn venue(&self) -> Venue {
        self.venue
    }

    async fn init(&self) -> Result<PoolInit, FeedError> {
        let token0 = address_from_word(&self.eth_call(TOKEN0_SELECTOR).await?)?;
        let token1 = address_from_word(&self.eth_call(TOKEN1_SELECTOR).await?)?;

        let slot0 = self.eth_call(SLOT0_SELECTOR).await?;
        let word = data_word(&slot0, 0)
            .ok_or_else(|| FeedError::Parse("slot0 response too short".to_string()))?;
        let sqrt_price = codec::parse_raw_sample(&format!("0x{}", word))
            .map_err(|e| FeedError::Parse(e.to_string()))?;

        info!(
            "Initialized {} pool {}: token0={} token1={}",
            self.venue, self.pool_address, token0, token1
        );
        Ok(PoolInit {
            token0,
            token1,
            sqrt_price,
        })
    }

    async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<VenueUpdate>, FeedError> {
        let venue = self.venue;
        let ws_url = self.rpc.ws_url.clone();
        let subscribe_msg = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_subscribe",
            "params": ["logs", {"address": self.pool_address, "topics": [swap_topic(venue)]}],
        });

        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                match connect_async(&ws_url).await {
                    Ok((ws_stream, _)) => {
                        info!("Connected to log stream for {}", venue);
                        let (mut write, mut read) = ws_stream.split();

                        let sub_text = serde_json::to_string(&subscribe_msg)
                            .expect("static subscription message");
                        // A failed subscribe falls through to the shared
                        // reconnect delay below; retrying immediately would
                        // hammer an endpoint that accepts connections but
                        // rejects writes.
                        match write.send(Message::Text(sub_text.into())).await {
                            Err(e) => error!("Failed to subscribe for {}: {}", venue, e),
                            Ok(()) => {
                                while let Some(msg) = read.next().await {
                                    match msg {
                                        Ok(Message::Text(text)) => {
                                            let Ok(frame) =
                                                serde_json::from_str::<serde_json::Value>(&text)
                                            else {
                                                warn!("Unparseable frame from {} stream", venue);
                                                continue;
                                            };
                                            // Subscription confirmations carry an
                                            // id, notifications a method.
                                            if frame["method"] != "eth_subscription" {
                                                debug!("{} stream control frame: {}", venue, text);
                                                continue;
                                            }
                                            let log = &frame["params"]["result"];
                                            if log["removed"].as_bool() == Some(true) {
                                                debug!("Skipping reorged log on {}", venue);
                                                continue;
                                            }
                                            match parse_swap_log(venue, log) {
                                                Ok(update) => {
                                                    if tx.send(update).is_err() {
                                                        return; // consumer gone
                                                    }
                                                }
                                                Err(e) => {
                                                    warn!("Dropping swap log on {}: {}", venue, e)
                                                }
                                            }
                                        }
                                        Ok(Message::Ping(payload)) => {
                                            let _ = write.send(Message::Pong(payload)).await;
                                        }
                                        Err(e) => {
                                            error!("{} WS error: {}", venue, e);
                                            break;
                                        }
                                        _ => {}
                                    }
                                }
                            }
                        }
                    }
                    Err(e) => {
                        error!("Failed to connect log stream for {}: {}", venue, e);
                    }
                }
                warn!("{} log stream disconnected, reconnecting in 1s...", venue);
                tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
            }
        });

        Ok(rx)
    }
}

/// Pull the sqrt price and transaction reference out of one Swap log.
fn parse_swap_log(venue: Venue, log: &serde_json::Value) -> Result<VenueUpdate, FeedError> {
    let data = log["data"]
        .as_str()
        .ok_or_else(|| FeedError::Parse("swap log has no data field".to_string()))?;
    let word = data_word(data, SQRT_PRICE_WORD)
        .ok_or_else(|| FeedError::Parse("swap log data too short".to_string()))?;
    let raw_sqrt_price = codec::parse_raw_sample(&format!("0x{}", word))
        .map_err(|e| FeedError::Parse(e.to_string()))?;

    Ok(VenueUpdate {
        venue,
        raw_sqrt_price,
        observed_at: Utc::now(),
        tx_reference: log["transactionHash"].as_str().map(String::from),
    })
}

/// The `index`-th 32-byte word of ABI-encoded return data / log data.
fn data_word(data: &str, index: usize) -> Option<&str> {
    let digits = data.strip_prefix("0x")?;
    digits.get(index * 64..(index + 1) * 64)
}

/// Decode an ABI-encoded address return value (left-padded 32-byte word).
fn address_from_word(word: &str) -> Result<String, FeedError> {
    let digits = word.strip_prefix("0x").unwrap_or(word);
    let bytes = hex::decode(digits)
        .map_err(|e| FeedError::Parse(format!("bad address word: {}", e)))?;
    if bytes.len() != 32 {
        return Err(FeedError::Parse(format!(
            "address word is {} bytes, expected 32",
            bytes.len()
        )));
    }
    Ok(format!("0x{}", hex::encode(&bytes[12..])))
}
