//! feed.rs - Exchange data access for the arbitrage engine
//!
//! `KucoinFeed` talks to the public KuCoin REST endpoints, `MockFeed`
//! serves canned data for tests and offline runs.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::FetchError;
use crate::models::{BookLevel, MarketId, OrderBookSnapshot, Symbol};

/// Trait defining the data the detector needs from an exchange
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// All listed symbols with their current best prices
    async fn fetch_symbols(&self) -> Result<Vec<Symbol>, FetchError>;

    /// Trade precision per coin
    async fn fetch_coin_precision(&self) -> Result<HashMap<String, u32>, FetchError>;

    /// Depth-1 order book of one market. Called concurrently.
    async fn fetch_order_book(&self, market: &MarketId) -> Result<OrderBookSnapshot, FetchError>;
}

// ============================================================================
// KuCoin API Response Structures
// ============================================================================

/// Every KuCoin answer is wrapped as `{ "success": bool, "data": ... }`
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SymbolData {
    #[serde(rename = "coinTypePair")]
    coin_type_pair: String,

    #[serde(rename = "coinType")]
    coin_type: String,

    #[serde(default)]
    trading: bool,

    /// Sometimes missing for illiquid markets
    buy: Option<Decimal>,

    sell: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct CoinData {
    coin: String,

    #[serde(rename = "tradePrecision")]
    trade_precision: u32,
}

/// Levels are `[price, volume in coin, volume in coin pair]`
#[derive(Debug, Deserialize)]
struct OrderBookData {
    #[serde(rename = "SELL", default)]
    sell: Vec<[Decimal; 3]>,

    #[serde(rename = "BUY", default)]
    buy: Vec<[Decimal; 3]>,
}

fn check_status(url: &str, status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn decode_envelope<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, FetchError> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })?;

    if !envelope.success {
        return Err(FetchError::Unsuccessful {
            url: url.to_string(),
        });
    }

    serde_json::from_value(envelope.data).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}

impl From<SymbolData> for Symbol {
    fn from(data: SymbolData) -> Self {
        Symbol {
            base: data.coin_type_pair,
            quote: data.coin_type,
            buy_price: data.buy,
            sell_price: data.sell,
            is_trading: data.trading,
        }
    }
}

fn first_level(side: &[[Decimal; 3]]) -> Option<BookLevel> {
    side.first()
        .map(|&[price, quote_volume, base_volume]| BookLevel::new(price, quote_volume, base_volume))
}

fn top_of_book(market: &MarketId, data: OrderBookData) -> Result<OrderBookSnapshot, FetchError> {
    match (first_level(&data.sell), first_level(&data.buy)) {
        (Some(best_ask), Some(best_bid)) => Ok(OrderBookSnapshot { best_ask, best_bid }),
        _ => Err(FetchError::EmptyBook {
            market: market.to_string(),
        }),
    }
}

// ============================================================================
// KucoinFeed - Live KuCoin REST access
// ============================================================================

#[derive(Debug, Clone)]
pub struct KucoinFeed {
    client: Client,
    config: Config,
}

impl KucoinFeed {
    /// Create a feed whose requests are all bounded by `config.request_timeout`
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(KucoinFeed { client, config })
    }

    async fn get_data<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!("Fetching from: {}", url);

        let response = self.client.get(url).send().await?;
        check_status(url, response.status())?;

        let body = response.text().await?;
        decode_envelope(url, &body)
    }
}

#[async_trait]
impl MarketFeed for KucoinFeed {
    async fn fetch_symbols(&self) -> Result<Vec<Symbol>, FetchError> {
        let data: Vec<SymbolData> = self.get_data(&self.config.symbols_url).await?;
        Ok(data.into_iter().map(Symbol::from).collect())
    }

    async fn fetch_coin_precision(&self) -> Result<HashMap<String, u32>, FetchError> {
        let data: Vec<CoinData> = self.get_data(&self.config.coins_url).await?;
        Ok(data
            .into_iter()
            .map(|coin| (coin.coin, coin.trade_precision))
            .collect())
    }

    async fn fetch_order_book(&self, market: &MarketId) -> Result<OrderBookSnapshot, FetchError> {
        let url = self.config.order_book_url(market);
        let data: OrderBookData = self.get_data(&url).await?;
        top_of_book(market, data)
    }
}

// ============================================================================
// MockFeed - For testing purposes
// ============================================================================

/// Canned feed for tests and development
#[derive(Debug, Clone, Default)]
pub struct MockFeed {
    symbols: Vec<Symbol>,
    precision: HashMap<String, u32>,
    books: HashMap<MarketId, OrderBookSnapshot>,
    failing: HashSet<MarketId>,
    delays: HashMap<MarketId, Duration>,
    symbols_down: bool,
    precision_down: bool,
    requests: Arc<Mutex<Vec<MarketId>>>,
}

impl MockFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbols(mut self, symbols: Vec<Symbol>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn with_precision(mut self, coin: &str, precision: u32) -> Self {
        self.precision.insert(coin.to_string(), precision);
        self
    }

    pub fn with_book(mut self, market: &str, ask: BookLevel, bid: BookLevel) -> Self {
        self.books.insert(
            market_id(market),
            OrderBookSnapshot {
                best_ask: ask,
                best_bid: bid,
            },
        );
        self
    }

    /// Order book requests for `market` fail
    pub fn failing(mut self, market: &str) -> Self {
        self.failing.insert(market_id(market));
        self
    }

    /// Order book requests for `market` take `delay` before answering
    pub fn slow(mut self, market: &str, delay: Duration) -> Self {
        self.delays.insert(market_id(market), delay);
        self
    }

    pub fn symbols_unavailable(mut self) -> Self {
        self.symbols_down = true;
        self
    }

    pub fn precision_unavailable(mut self) -> Self {
        self.precision_down = true;
        self
    }

    /// Order book requests seen so far, in arrival order
    pub async fn requested(&self) -> Vec<MarketId> {
        self.requests.lock().await.clone()
    }
}

/// Parse `QUOTE-BASE`
fn market_id(market: &str) -> MarketId {
    match market.split_once('-') {
        Some((quote, base)) => MarketId::new(quote, base),
        None => MarketId::new(market, ""),
    }
}

#[async_trait]
impl MarketFeed for MockFeed {
    async fn fetch_symbols(&self) -> Result<Vec<Symbol>, FetchError> {
        if self.symbols_down {
            return Err(FetchError::Unavailable("mock symbols unavailable".to_string()));
        }
        Ok(self.symbols.clone())
    }

    async fn fetch_coin_precision(&self) -> Result<HashMap<String, u32>, FetchError> {
        if self.precision_down {
            return Err(FetchError::Unavailable("mock precision unavailable".to_string()));
        }
        Ok(self.precision.clone())
    }

    async fn fetch_order_book(&self, market: &MarketId) -> Result<OrderBookSnapshot, FetchError> {
        self.requests.lock().await.push(market.clone());

        if let Some(delay) = self.delays.get(market) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(market) {
            return Err(FetchError::Unavailable(format!("mock failure for {}", market)));
        }

        self.books
            .get(market)
            .copied()
            .ok_or_else(|| FetchError::Unavailable(format!("no mock book for {}", market)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_symbols() {
        let body = r#"{
            "success": true,
            "data": [
                {"coinType": "NEO", "coinTypePair": "ETH", "trading": true, "buy": 0.006, "sell": 0.0061},
                {"coinType": "GAS", "coinTypePair": "ETH", "trading": false}
            ]
        }"#;

        let data: Vec<SymbolData> = decode_envelope("symbols", body).unwrap();
        let symbols: Vec<Symbol> = data.into_iter().map(Symbol::from).collect();

        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].base, "ETH");
        assert_eq!(symbols[0].quote, "NEO");
        assert_eq!(symbols[0].buy_price, Some(dec!(0.006)));
        assert_eq!(symbols[0].sell_price, Some(dec!(0.0061)));
        assert!(symbols[0].is_trading);
        assert_eq!(symbols[1].buy_price, None);
        assert!(!symbols[1].is_trading);
    }

    #[test]
    fn test_check_status() {
        assert!(check_status("symbols", StatusCode::OK).is_ok());

        let err = check_status("symbols", StatusCode::SERVICE_UNAVAILABLE).unwrap_err();
        assert!(matches!(err, FetchError::Status { ref url, status: 503 } if url == "symbols"));
        assert!(check_status("symbols", StatusCode::NOT_FOUND).is_err());
    }

    #[test]
    fn test_decode_unsuccessful_envelope() {
        let err = decode_envelope::<Vec<CoinData>>("coins", r#"{"success": false}"#).unwrap_err();
        assert!(matches!(err, FetchError::Unsuccessful { .. }));
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_envelope::<Vec<CoinData>>("coins", "<html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn test_decode_coins() {
        let body = r#"{"success": true, "data": [{"coin": "NEO", "tradePrecision": 4}]}"#;
        let coins: Vec<CoinData> = decode_envelope("coins", body).unwrap();
        assert_eq!(coins[0].coin, "NEO");
        assert_eq!(coins[0].trade_precision, 4);
    }

    #[test]
    fn test_top_of_book_keeps_first_level() {
        let body = r#"{"success": true, "data": {
            "SELL": [[0.0061, 10, 0.061], [0.0062, 5, 0.031]],
            "BUY": [[0.006, 8, 0.048]]
        }}"#;
        let data: OrderBookData = decode_envelope("book", body).unwrap();
        let book = top_of_book(&MarketId::new("NEO", "ETH"), data).unwrap();

        assert_eq!(book.best_ask.price, dec!(0.0061));
        assert_eq!(book.best_ask.quote_volume, dec!(10));
        assert_eq!(book.best_ask.base_volume, dec!(0.061));
        assert_eq!(book.best_bid.price, dec!(0.006));
    }

    #[test]
    fn test_top_of_book_empty_side() {
        let body = r#"{"success": true, "data": {"SELL": [], "BUY": [[0.006, 8, 0.048]]}}"#;
        let data: OrderBookData = decode_envelope("book", body).unwrap();
        let err = top_of_book(&MarketId::new("NEO", "ETH"), data).unwrap_err();
        assert!(matches!(err, FetchError::EmptyBook { ref market } if market == "NEO-ETH"));
    }

    #[tokio::test]
    async fn test_mock_feed_books_and_failures() {
        let level = BookLevel::new(dec!(1), dec!(1), dec!(1));
        let feed = MockFeed::new()
            .with_book("NEO-ETH", level, level)
            .failing("GAS-ETH");

        assert!(feed.fetch_order_book(&MarketId::new("NEO", "ETH")).await.is_ok());
        assert!(feed.fetch_order_book(&MarketId::new("GAS", "ETH")).await.is_err());
        assert!(feed.fetch_order_book(&MarketId::new("BTC", "ETH")).await.is_err());
        assert_eq!(feed.requested().await.len(), 3);
    }

    #[tokio::test]
    async fn test_mock_feed_one_shot_failures() {
        let feed = MockFeed::new().symbols_unavailable().precision_unavailable();
        assert!(feed.fetch_symbols().await.is_err());
        assert!(feed.fetch_coin_precision().await.is_err());
    }
}
