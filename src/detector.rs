//! detector.rs - One detection pass: symbols, graph, candidates, confirmation
//!
//! ```text
//! fetch_symbols ──► MarketGraph::build ──► CycleEnumerator::candidates
//!                                                   │ (one at a time)
//!                                                   ▼
//!                       SnapshotValidator::validate (3 books, joined)
//!                                                   │ confirmed
//!                                                   ▼
//!                                 OpportunityReporter::report
//! ```

use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::cycle::CycleEnumerator;
use crate::error::ArbitrageError;
use crate::feed::MarketFeed;
use crate::graph::MarketGraph;
use crate::models::Opportunity;
use crate::reporter::OpportunityReporter;
use crate::validator::{Rejection, SnapshotValidator, Validation};

/// Outcome of one detection pass
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub opportunities: Vec<Opportunity>,
    /// Markets in the graph
    pub graph_markets: usize,
    /// Candidates found on stale prices
    pub candidates: usize,
    /// Candidates dropped during validation
    pub rejected: usize,
    pub elapsed: Duration,
}

pub struct ArbitrageDetector {
    feed: Arc<dyn MarketFeed>,
    validator: SnapshotValidator,
    trade_precision: HashMap<String, u32>,
}

impl ArbitrageDetector {
    /// Fetch coin precision once and set up the detector.
    ///
    /// Precision is kept for reference only; nothing is rounded with it.
    pub async fn connect(feed: Arc<dyn MarketFeed>, config: &Config) -> Result<Self, ArbitrageError> {
        let started = Instant::now();
        let trade_precision = feed
            .fetch_coin_precision()
            .await
            .map_err(ArbitrageError::PrecisionFetch)?;
        info!(
            "Trade precision for {} coins downloaded in {:.2}s",
            trade_precision.len(),
            started.elapsed().as_secs_f64()
        );

        let validator = SnapshotValidator::new(Arc::clone(&feed), config.request_timeout);

        Ok(ArbitrageDetector {
            feed,
            validator,
            trade_precision,
        })
    }

    pub fn trade_precision(&self) -> &HashMap<String, u32> {
        &self.trade_precision
    }

    /// Run a full pass. Only a symbol fetch failure or a crossed symbol
    /// aborts it; candidate-level problems are counted as rejections.
    pub async fn run(&self) -> Result<ScanReport, ArbitrageError> {
        let started = Instant::now();

        let symbols = self
            .feed
            .fetch_symbols()
            .await
            .map_err(ArbitrageError::SymbolFetch)?;
        debug!(
            "{} symbols downloaded in {:.2}s",
            symbols.len(),
            started.elapsed().as_secs_f64()
        );

        let graph = MarketGraph::build(&symbols)?;
        let candidates = CycleEnumerator::new(&graph).candidates();
        info!(
            "{} markets in graph, {} candidates on stale prices",
            graph.len(),
            candidates.len()
        );

        let mut opportunities = Vec::new();
        let mut rejected = 0;

        for candidate in &candidates {
            debug!("Validating {}", candidate.route());

            match self.validator.validate(candidate).await {
                Validation::Confirmed(validated) => {
                    let opportunity = OpportunityReporter::report(&validated, candidate);
                    info!("Confirmed: {}", opportunity);
                    opportunities.push(opportunity);
                }
                Validation::Rejected(rejection @ Rejection::Fetch { .. }) => {
                    rejected += 1;
                    warn!("Dropping {}: {}", candidate.route(), rejection);
                }
                Validation::Rejected(rejection) => {
                    rejected += 1;
                    debug!("Dropping {}: {}", candidate.route(), rejection);
                }
            }
        }

        Ok(ScanReport {
            opportunities,
            graph_markets: graph.len(),
            candidates: candidates.len(),
            rejected,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MockFeed;
    use crate::models::{BookLevel, Symbol};
    use rust_decimal_macros::dec;

    fn feed() -> MockFeed {
        MockFeed::new()
            .with_precision("NEO", 4)
            .with_precision("GAS", 2)
            .with_symbols(vec![
                Symbol::new("ETH", "NEO", dec!(0.006), dec!(0.0061)),
                Symbol::new("ETH", "GAS", dec!(0.002), dec!(0.0021)),
                Symbol::new("GAS", "NEO", dec!(0.33), dec!(0.34)),
            ])
    }

    #[tokio::test]
    async fn test_connect_keeps_precision() {
        let detector = ArbitrageDetector::connect(Arc::new(feed()), &Config::default())
            .await
            .unwrap();
        assert_eq!(detector.trade_precision().get("NEO"), Some(&4));
    }

    #[tokio::test]
    async fn test_connect_fails_without_precision() {
        let result = ArbitrageDetector::connect(Arc::new(feed().precision_unavailable()), &Config::default()).await;
        assert!(matches!(result, Err(ArbitrageError::PrecisionFetch(_))));
    }

    #[tokio::test]
    async fn test_run_counts_fetch_rejection() {
        // Candidate is GAS -> NEO -> ETH; its market2 has no book
        let detector = ArbitrageDetector::connect(Arc::new(feed()), &Config::default())
            .await
            .unwrap();
        let report = detector.run().await.unwrap();

        assert_eq!(report.graph_markets, 3);
        assert_eq!(report.candidates, 1);
        assert_eq!(report.rejected, 1);
        assert!(report.opportunities.is_empty());
    }

    #[tokio::test]
    async fn test_run_confirms_with_fresh_books() {
        let level = |price| BookLevel::new(price, dec!(1), dec!(2));
        let mock = feed()
            .with_book("NEO-GAS", level(dec!(0.34)), level(dec!(0.33)))
            .with_book("NEO-ETH", level(dec!(0.0061)), level(dec!(0.006)))
            .with_book("GAS-ETH", level(dec!(0.0021)), level(dec!(0.002)));
        let detector = ArbitrageDetector::connect(Arc::new(mock), &Config::default())
            .await
            .unwrap();

        let report = detector.run().await.unwrap();
        assert_eq!(report.rejected, 0);
        assert_eq!(report.opportunities.len(), 1);
        assert_eq!(report.opportunities[0].route, "GAS -> NEO -> ETH -> GAS");
    }
}
