//! validator.rs - Confirms stale candidates against freshly fetched order books

use log::debug;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cycle::comparison_value;
use crate::error::FetchError;
use crate::feed::MarketFeed;
use crate::models::{Candidate, MarketId, OrderBookSnapshot, Quote, ValidatedOpportunity};

/// Why a candidate did not survive validation. None of these are faults.
#[derive(Debug)]
pub enum Rejection {
    /// One of the three order books could not be fetched in time
    Fetch { market: MarketId, error: FetchError },
    /// Fresh prices no longer show an edge
    Stale { buy: Decimal, cmp_val: Decimal },
    /// Fresh prices of `market` give a zero divisor or a result outside the decimal range
    Unpriceable { market: MarketId },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Fetch { market, error } => write!(f, "fetch of {} failed: {}", market, error),
            Rejection::Stale { buy, cmp_val } => write!(f, "stale: buy {} >= {}", buy, cmp_val),
            Rejection::Unpriceable { market } => write!(f, "{} cannot be priced", market),
        }
    }
}

#[derive(Debug)]
pub enum Validation {
    Confirmed(ValidatedOpportunity),
    Rejected(Rejection),
}

/// Re-checks a candidate on fresh top-of-book data
pub struct SnapshotValidator {
    feed: Arc<dyn MarketFeed>,
    timeout: Duration,
}

impl SnapshotValidator {
    pub fn new(feed: Arc<dyn MarketFeed>, timeout: Duration) -> Self {
        SnapshotValidator { feed, timeout }
    }

    /// Fetch the three books of `candidate` and evaluate them.
    ///
    /// Nothing is compared until all three fetches are done; any failure
    /// rejects the whole candidate.
    pub async fn validate(&self, candidate: &Candidate) -> Validation {
        match self.fetch_books(&candidate.markets()).await {
            Ok(books) => evaluate(candidate, books),
            Err(rejection) => Validation::Rejected(rejection),
        }
    }

    /// Fetch three books concurrently, all or nothing
    pub async fn fetch_books(&self, markets: &[MarketId; 3]) -> Result<[OrderBookSnapshot; 3], Rejection> {
        let started = Instant::now();
        let [m1, m2, m3] = markets;

        let (b1, b2, b3) = tokio::join!(
            self.fetch_with_timeout(m1),
            self.fetch_with_timeout(m2),
            self.fetch_with_timeout(m3)
        );
        debug!(
            "Order books for {}, {}, {} fetched in {:.2}s",
            m1,
            m2,
            m3,
            started.elapsed().as_secs_f64()
        );

        let check = |market: &MarketId, result: Result<OrderBookSnapshot, FetchError>| {
            result.map_err(|error| Rejection::Fetch {
                market: market.clone(),
                error,
            })
        };

        Ok([check(m1, b1)?, check(m2, b2)?, check(m3, b3)?])
    }

    async fn fetch_with_timeout(&self, market: &MarketId) -> Result<OrderBookSnapshot, FetchError> {
        match tokio::time::timeout(self.timeout, self.feed.fetch_order_book(market)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                market: market.to_string(),
                after: self.timeout,
            }),
        }
    }
}

/// Recompute the comparison from fresh books only; stale prices are ignored
pub fn evaluate(candidate: &Candidate, books: [OrderBookSnapshot; 3]) -> Validation {
    let [market1, market2, market3] = &books;

    let buy = market1.best_ask.price;
    let sell = market1.best_bid.price;
    let buy_other = market2.best_ask.price;
    let sell_other = market2.best_bid.price;
    let ratio = Quote {
        ask: market3.best_ask.price,
        bid: market3.best_bid.price,
    };

    let cmp_val = match comparison_value(sell_other, &ratio, candidate.ratio_reversed) {
        Some(v) => v,
        None => {
            return Validation::Rejected(Rejection::Unpriceable {
                market: candidate.market3(),
            })
        }
    };

    if buy >= cmp_val {
        return Validation::Rejected(Rejection::Stale { buy, cmp_val });
    }

    let profit_ratio = match cmp_val.checked_div(buy) {
        Some(v) => v,
        None => {
            return Validation::Rejected(Rejection::Unpriceable {
                market: candidate.market1(),
            })
        }
    };

    Validation::Confirmed(ValidatedOpportunity {
        buy,
        sell,
        buy_other,
        sell_other,
        cmp_val,
        profit_ratio,
        books,
    })
}
