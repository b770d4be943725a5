//! config.rs - Runtime configuration read from the environment
//!
//! Every setting has a default pointing at the public KuCoin endpoints, so
//! the scanner runs without any environment at all.

use rust_decimal::Decimal;
use std::time::Duration;

use crate::error::ArbitrageError;
use crate::models::MarketId;

/// All symbols with buy/sell prices and trading status
pub const DEFAULT_SYMBOLS_URL: &str = "https://kitchen-3.kucoin.com/v1/market/open/symbols";

/// Coin metadata, used for trade precision
pub const DEFAULT_COINS_URL: &str = "https://kitchen-3.kucoin.com/v1/market/open/coins";

/// Open orders of one market, `{market}` is replaced by e.g. `NEO-ETH`
pub const DEFAULT_ORDER_BOOK_URL: &str = "https://kitchen-3.kucoin.com/v1/{market}/open/orders?limit=1";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SCAN_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub symbols_url: String,
    pub coins_url: String,
    pub order_book_url: String,
    /// Upper bound for every single request
    pub request_timeout: Duration,
    pub scan_interval: Duration,
    /// Run one detection pass and exit
    pub run_once: bool,
    /// Exchange fee per trade. Not applied to the detection arithmetic.
    pub trade_fee: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            symbols_url: DEFAULT_SYMBOLS_URL.to_string(),
            coins_url: DEFAULT_COINS_URL.to_string(),
            order_book_url: DEFAULT_ORDER_BOOK_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            scan_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
            run_once: false,
            trade_fee: Decimal::new(1, 3),
        }
    }
}

impl Config {
    /// Read `TRIARB_*` variables, falling back to defaults
    pub fn from_env() -> Result<Self, ArbitrageError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ArbitrageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("TRIARB_SYMBOLS_URL") {
            config.symbols_url = url;
        }
        if let Some(url) = lookup("TRIARB_COINS_URL") {
            config.coins_url = url;
        }
        if let Some(url) = lookup("TRIARB_ORDER_BOOK_URL") {
            if !url.contains("{market}") {
                return Err(ArbitrageError::Config {
                    key: "TRIARB_ORDER_BOOK_URL".to_string(),
                    value: url,
                });
            }
            config.order_book_url = url;
        }
        if let Some(secs) = parse_secs(&lookup, "TRIARB_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = secs;
        }
        if let Some(secs) = parse_secs(&lookup, "TRIARB_SCAN_INTERVAL_SECS")? {
            config.scan_interval = secs;
        }
        if let Some(flag) = lookup("TRIARB_RUN_ONCE") {
            config.run_once = flag == "1" || flag.to_lowercase() == "true";
        }

        Ok(config)
    }

    /// Order book URL for one market
    pub fn order_book_url(&self, market: &MarketId) -> String {
        self.order_book_url.replace("{market}", market.as_str())
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>, ArbitrageError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
            _ => Err(ArbitrageError::Config {
                key: key.to_string(),
                value: raw,
            }),
        },
    }
}
