//! cycle.rs - Triangular cycle search over the market graph

use log::debug;
use rust_decimal::Decimal;

use crate::graph::MarketGraph;
use crate::models::{Candidate, Quote};

/// Synthetic price of the quote currency in `base1` units, going through `base2`.
///
/// `sell_other` is the bid of the quote on `base2`. With a direct cross
/// market (`base2` priced in `base1`) the proceeds are sold at its bid;
/// reversed (`base1` priced in `base2`) they buy `base1` at its ask.
/// Returns `None` when the reversed ask is zero or the result overflows.
pub fn comparison_value(sell_other: Decimal, ratio: &Quote, ratio_reversed: bool) -> Option<Decimal> {
    if ratio_reversed {
        sell_other.checked_div(ratio.ask)
    } else {
        sell_other.checked_mul(ratio.bid)
    }
}

/// Walks a [`MarketGraph`] looking for `base1 -> quote -> base2 -> base1` cycles
pub struct CycleEnumerator<'a> {
    graph: &'a MarketGraph,
}

impl<'a> CycleEnumerator<'a> {
    pub fn new(graph: &'a MarketGraph) -> Self {
        CycleEnumerator { graph }
    }

    /// Every connected `(base1, quote, base2)` triple with its comparison value.
    ///
    /// Both directions of a pair of bases are evaluated on their own; nothing
    /// is deduplicated. Order follows map iteration and means nothing.
    pub fn scan(&self) -> Vec<Candidate> {
        let mut evaluated = Vec::new();

        for (base1, quotes) in self.graph.bases() {
            for (coin, direct) in quotes {
                for (base2, other_quotes) in self.graph.bases() {
                    if base2 == base1 {
                        continue;
                    }
                    let other = match other_quotes.get(coin) {
                        Some(other) => other,
                        None => continue,
                    };

                    let (ratio, ratio_reversed) = match self.graph.quote(base1, base2) {
                        Some(ratio) => (ratio, false),
                        None => match self.graph.quote(base2, base1) {
                            Some(ratio) => (ratio, true),
                            None => continue,
                        },
                    };

                    let cmp_val = match comparison_value(other.bid, ratio, ratio_reversed) {
                        Some(v) => v,
                        None => {
                            debug!("Skipping {} -> {} -> {}: cross price out of range", base1, coin, base2);
                            continue;
                        }
                    };

                    evaluated.push(Candidate {
                        base1: base1.clone(),
                        quote: coin.clone(),
                        base2: base2.clone(),
                        ratio_reversed,
                        buy: direct.ask,
                        cmp_val,
                    });
                }
            }
        }

        evaluated
    }

    /// Triples whose direct buy price is strictly below the synthetic price
    pub fn candidates(&self) -> Vec<Candidate> {
        self.scan()
            .into_iter()
            .filter(|c| c.buy < c.cmp_val)
            .collect()
    }
}
