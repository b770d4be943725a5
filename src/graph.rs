//! graph.rs - In-memory market graph built from the exchange symbol list

use log::debug;
use std::collections::HashMap;

use crate::error::ArbitrageError;
use crate::models::{Quote, Symbol};

/// All tradable pairs of one pass, keyed `base -> quote -> Quote`.
///
/// Built once per detection pass and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketGraph {
    markets: HashMap<String, HashMap<String, Quote>>,
}

impl MarketGraph {
    /// Build the graph from a flat symbol list.
    ///
    /// Inactive symbols and symbols without both prices are skipped. A
    /// symbol whose buy price exceeds its sell price aborts the build.
    /// When the same `(base, quote)` shows up twice the later one wins.
    pub fn build(symbols: &[Symbol]) -> Result<Self, ArbitrageError> {
        let mut markets: HashMap<String, HashMap<String, Quote>> = HashMap::new();
        let mut skipped = 0usize;

        for sym in symbols {
            if !sym.is_trading {
                continue;
            }

            let (buy, sell) = match (sym.buy_price, sym.sell_price) {
                (Some(buy), Some(sell)) => (buy, sell),
                _ => {
                    skipped += 1;
                    debug!("Skipping {}: incomplete quotes", sym.market_id());
                    continue;
                }
            };

            if buy > sell {
                return Err(ArbitrageError::DataIntegrity {
                    market: sym.market_id().to_string(),
                    buy,
                    sell,
                });
            }

            markets
                .entry(sym.base.clone())
                .or_default()
                .insert(sym.quote.clone(), Quote { ask: sell, bid: buy });
        }

        if skipped > 0 {
            debug!("{} symbols without buy/sell quotes left out of the graph", skipped);
        }

        Ok(MarketGraph { markets })
    }

    /// Prices of `quote` expressed in `base`
    pub fn quote(&self, base: &str, quote: &str) -> Option<&Quote> {
        self.markets.get(base).and_then(|quotes| quotes.get(quote))
    }

    /// Every quote currency traded against `base`
    pub fn quotes_of(&self, base: &str) -> Option<&HashMap<String, Quote>> {
        self.markets.get(base)
    }

    pub fn bases(&self) -> impl Iterator<Item = (&String, &HashMap<String, Quote>)> {
        self.markets.iter()
    }

    /// Number of markets (pairs) in the graph
    pub fn len(&self) -> usize {
        self.markets.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn symbols() -> Vec<Symbol> {
        vec![
            Symbol::new("ETH", "NEO", dec!(0.006), dec!(0.0061)),
            Symbol::new("ETH", "GAS", dec!(0.002), dec!(0.0021)),
            Symbol::new("GAS", "NEO", dec!(0.33), dec!(0.34)),
        ]
    }

    #[test]
    fn test_build_stores_ask_and_bid() {
        let graph = MarketGraph::build(&symbols()).unwrap();

        assert_eq!(graph.len(), 3);
        let neo = graph.quote("ETH", "NEO").unwrap();
        assert_eq!(neo.ask, dec!(0.0061));
        assert_eq!(neo.bid, dec!(0.006));
        assert!(graph.quote("NEO", "ETH").is_none());
    }

    #[test]
    fn test_build_skips_inactive_and_incomplete() {
        let mut inactive = Symbol::new("BTC", "NEO", dec!(0.001), dec!(0.0011));
        inactive.is_trading = false;
        let mut incomplete = Symbol::new("BTC", "GAS", dec!(0.001), dec!(0.0011));
        incomplete.sell_price = None;

        let mut input = symbols();
        input.push(inactive);
        input.push(incomplete);

        let graph = MarketGraph::build(&input).unwrap();
        assert_eq!(graph.len(), 3);
        assert!(graph.quotes_of("BTC").is_none());
    }

    #[test]
    fn test_build_rejects_crossed_quotes() {
        let mut input = symbols();
        input.push(Symbol::new("BTC", "NEO", dec!(0.002), dec!(0.001)));

        match MarketGraph::build(&input) {
            Err(ArbitrageError::DataIntegrity { market, buy, sell }) => {
                assert_eq!(market, "NEO-BTC");
                assert_eq!(buy, dec!(0.002));
                assert_eq!(sell, dec!(0.001));
            }
            other => panic!("expected integrity fault, got {:?}", other),
        }
    }

    #[test]
    fn test_build_keeps_equal_quotes() {
        let graph = MarketGraph::build(&[Symbol::new("ETH", "NEO", dec!(0.006), dec!(0.006))]).unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_build_last_write_wins() {
        let graph = MarketGraph::build(&[
            Symbol::new("ETH", "NEO", dec!(0.006), dec!(0.0061)),
            Symbol::new("ETH", "NEO", dec!(0.007), dec!(0.0071)),
        ])
        .unwrap();

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.quote("ETH", "NEO").unwrap().bid, dec!(0.007));
    }

    #[test]
    fn test_build_is_deterministic_and_order_independent() {
        let forward = MarketGraph::build(&symbols()).unwrap();
        let again = MarketGraph::build(&symbols()).unwrap();
        let mut reversed_input = symbols();
        reversed_input.reverse();
        let reversed = MarketGraph::build(&reversed_input).unwrap();

        assert_eq!(forward, again);
        assert_eq!(forward, reversed);
    }
}
