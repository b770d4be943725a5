//! KuCoin Triangular Arbitrage Scanner
//!
//! Finds `base1 -> coin -> base2 -> base1` price discrepancies across the
//! markets of a single exchange and confirms each one against fresh order
//! books before reporting it.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Main Loop                         │
//! │  (Periodic detection passes, prints opportunities)   │
//! └────────────────────────┬────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                 ArbitrageDetector                    │
//! │  MarketGraph -> CycleEnumerator -> SnapshotValidator │
//! │                               -> OpportunityReporter │
//! └────────────────────────┬────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                 MarketFeed Trait                     │
//! │  - fetch_symbols()                                   │
//! │  - fetch_coin_precision()                            │
//! │  - fetch_order_book(market)                          │
//! └────────────────────────┬────────────────────────────┘
//!                          │
//!          ┌───────────────┴───────────────┐
//!          │                               │
//!          ▼                               ▼
//! ┌─────────────────┐           ┌─────────────────┐
//! │   KucoinFeed    │           │    MockFeed     │
//! │  (Production)   │           │    (Testing)    │
//! └─────────────────┘           └─────────────────┘
//! ```
//!
//! Only detection: no orders are placed.

pub mod config;
pub mod cycle;
pub mod detector;
pub mod error;
pub mod feed;
pub mod graph;
pub mod models;
pub mod reporter;
pub mod validator;

// Re-export commonly used types
pub use config::Config;
pub use cycle::CycleEnumerator;
pub use detector::{ArbitrageDetector, ScanReport};
pub use error::{ArbitrageError, FetchError};
pub use feed::{KucoinFeed, MarketFeed, MockFeed};
pub use graph::MarketGraph;
pub use models::{
    BookLevel,
    Candidate,
    MarketId,
    Opportunity,
    OrderBookSnapshot,
    Quote,
    Symbol,
    ValidatedOpportunity,
};
pub use reporter::OpportunityReporter;
pub use validator::{Rejection, SnapshotValidator, Validation};

/// Version of the scanner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the package
pub const NAME: &str = env!("CARGO_PKG_NAME");
