//! error.rs - Error types for the detection pass and the exchange feed

use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single request made through a [`crate::feed::MarketFeed`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request for {market} timed out after {after:?}")]
    Timeout { market: String, after: Duration },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("{url} answered with success = false")]
    Unsuccessful { url: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("order book for {market} has an empty side")]
    EmptyBook { market: String },

    #[error("{0}")]
    Unavailable(String),
}

/// Errors that abort a whole detection pass.
///
/// Anything scoped to one symbol or one candidate is handled locally and
/// never shows up here.
#[derive(Debug, Error)]
pub enum ArbitrageError {
    #[error("symbol {market} has buy price {buy} above sell price {sell}")]
    DataIntegrity {
        market: String,
        buy: Decimal,
        sell: Decimal,
    },

    #[error("failed to fetch symbols: {0}")]
    SymbolFetch(#[source] FetchError),

    #[error("failed to fetch coin precision: {0}")]
    PrecisionFetch(#[source] FetchError),

    #[error("invalid value {value:?} for {key}")]
    Config { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_integrity_message_names_market() {
        let err = ArbitrageError::DataIntegrity {
            market: "NEO-ETH".to_string(),
            buy: dec!(0.007),
            sell: dec!(0.006),
        };
        let msg = err.to_string();
        assert!(msg.contains("NEO-ETH"));
        assert!(msg.contains("0.007"));
    }

    #[test]
    fn test_symbol_fetch_wraps_source() {
        let err = ArbitrageError::SymbolFetch(FetchError::Status {
            url: "http://x/symbols".to_string(),
            status: 503,
        });
        assert!(err.to_string().contains("503"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
