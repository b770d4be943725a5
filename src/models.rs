//! models.rs - Core data structures for the arbitrage engine
//!
//! Symbols and order books come in from the feed, candidates and
//! opportunities go out of the detector.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable pair as listed by the exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Symbol {
    /// Settlement currency, prices are expressed in it (KuCoin's `coinTypePair`)
    pub base: String,
    /// Traded currency (KuCoin's `coinType`)
    pub quote: String,
    /// Best price people are buying at
    pub buy_price: Option<Decimal>,
    /// Best price people are selling at
    pub sell_price: Option<Decimal>,
    pub is_trading: bool,
}

impl Symbol {
    pub fn new(base: &str, quote: &str, buy_price: Decimal, sell_price: Decimal) -> Self {
        Symbol {
            base: base.to_string(),
            quote: quote.to_string(),
            buy_price: Some(buy_price),
            sell_price: Some(sell_price),
            is_trading: true,
        }
    }

    pub fn market_id(&self) -> MarketId {
        MarketId::new(&self.quote, &self.base)
    }
}

/// Market identifier in exchange format, `{quote}-{base}` (e.g. `NEO-ETH`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarketId(String);

impl MarketId {
    pub fn new(quote: &str, base: &str) -> Self {
        MarketId(format!("{}-{}", quote, base))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Top-of-book prices for one market, both in base units.
///
/// `ask` is what buying the quote currency costs, `bid` is what selling it
/// yields. On a symbol these are its `sell_price` and `buy_price`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    pub ask: Decimal,
    pub bid: Decimal,
}

/// One order-book level: `[price, quote volume, base volume]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookLevel {
    pub price: Decimal,
    pub quote_volume: Decimal,
    pub base_volume: Decimal,
}

impl BookLevel {
    pub fn new(price: Decimal, quote_volume: Decimal, base_volume: Decimal) -> Self {
        BookLevel {
            price,
            quote_volume,
            base_volume,
        }
    }
}

/// Depth-1 order book for a market
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderBookSnapshot {
    pub best_ask: BookLevel,
    pub best_bid: BookLevel,
}

/// A triangular cycle `base1 -> quote -> base2 -> base1` found on stale prices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub base1: String,
    pub quote: String,
    pub base2: String,
    /// The cross market is `base1` priced in `base2` instead of the other way round
    pub ratio_reversed: bool,
    /// Direct buy price of `quote` in `base1` units
    pub buy: Decimal,
    /// Synthetic price of `quote` in `base1` units obtained through `base2`
    pub cmp_val: Decimal,
}

impl Candidate {
    pub fn market1(&self) -> MarketId {
        MarketId::new(&self.quote, &self.base1)
    }

    pub fn market2(&self) -> MarketId {
        MarketId::new(&self.quote, &self.base2)
    }

    pub fn market3(&self) -> MarketId {
        if self.ratio_reversed {
            MarketId::new(&self.base1, &self.base2)
        } else {
            MarketId::new(&self.base2, &self.base1)
        }
    }

    pub fn markets(&self) -> [MarketId; 3] {
        [self.market1(), self.market2(), self.market3()]
    }

    /// Format the cycle as a path (e.g. "ETH -> NEO -> GAS -> ETH")
    pub fn route(&self) -> String {
        format!(
            "{} -> {} -> {} -> {}",
            self.base1, self.quote, self.base2, self.base1
        )
    }
}

/// A candidate that still holds on freshly fetched books
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOpportunity {
    pub buy: Decimal,
    pub sell: Decimal,
    pub buy_other: Decimal,
    pub sell_other: Decimal,
    pub cmp_val: Decimal,
    /// `cmp_val / buy`
    pub profit_ratio: Decimal,
    /// Books for market1, market2 and market3, in that order
    pub books: [OrderBookSnapshot; 3],
}

/// Represents a confirmed, reportable arbitrage opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub market1: MarketId,
    pub market2: MarketId,
    pub market3: MarketId,
    pub route: String,
    pub cmp_val: Decimal,
    pub buy: Decimal,
    /// `cmp_val / buy`
    pub profit_ratio: Decimal,
    pub market1_volume: Decimal,
    pub market2_volume: Decimal,
    pub market3_volume: Decimal,
    pub tradeable_volume: Decimal,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Opportunity {
    /// Profit as printed by the scanner: the raw ratio scaled by 100.
    ///
    /// This is not `(ratio - 1) * 100`; downstream consumers rely on the
    /// existing figure. Saturates at `Decimal::MAX`.
    pub fn profit_percentage(&self) -> Decimal {
        self.profit_ratio.saturating_mul(Decimal::from(100))
    }
}

impl fmt::Display for Opportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | opportunity! {:.4}% | volume {}",
            self.route,
            self.profit_percentage(),
            self.tradeable_volume
        )
    }
}
